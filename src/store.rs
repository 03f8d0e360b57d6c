//! Draft persistence: markdown files in a writings directory.
//!
//! The title line round-trips as a leading `# ` heading; filenames are a
//! slug of the title with a timestamp fallback.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Draft {
    pub path: PathBuf,
    pub title: String,
    pub word_count: usize,
    pub modified: DateTime<Local>,
}

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating writings dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// `$HOME/.driftpen/writings`, created on demand.
    pub fn open_default() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Self::new(Path::new(&home).join(".driftpen").join("writings"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All drafts, newest first.
    pub fn list(&self) -> Vec<Draft> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut drafts: Vec<Draft> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("md") {
                    return None;
                }
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .map(DateTime::<Local>::from)
                    .unwrap_or_else(|_| Local::now());
                let content = fs::read_to_string(&path).unwrap_or_default();
                let (title, body) = split_heading(&content);
                let title = if title.is_empty() {
                    filename_title(&path)
                } else {
                    title.to_string()
                };
                Some(Draft {
                    path,
                    title,
                    word_count: body.split_whitespace().count(),
                    modified,
                })
            })
            .collect();
        drafts.sort_by(|a, b| b.modified.cmp(&a.modified));
        drafts
    }

    /// Load a draft as (title, body).
    pub fn load(&self, path: &Path) -> Result<(String, String)> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let (title, body) = split_heading(&content);
        Ok((title.to_string(), body.to_string()))
    }

    /// Save a draft; an empty draft is a no-op. Returns the path written,
    /// reusing `existing` when the draft was loaded from disk.
    pub fn save(&self, title: &str, body: &str, existing: Option<&Path>) -> Result<Option<PathBuf>> {
        let title = title.trim();
        if title.is_empty() && body.trim().is_empty() {
            return Ok(None);
        }

        let path = match existing {
            Some(path) => path.to_path_buf(),
            None => {
                let stem = if title.is_empty() {
                    Local::now().format("%Y-%m-%d-%H%M%S").to_string()
                } else {
                    slugify(title)
                };
                self.unique_path(&stem)
            }
        };

        let content = if title.is_empty() {
            body.to_string()
        } else {
            format!("# {}\n\n{}", title, body)
        };
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "draft saved");
        Ok(Some(path))
    }

    pub fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("deleting {}", path.display()))
    }

    fn unique_path(&self, stem: &str) -> PathBuf {
        let candidate = self.dir.join(format!("{}.md", stem));
        if !candidate.exists() {
            return candidate;
        }
        let mut n = 2;
        loop {
            let candidate = self.dir.join(format!("{}-{}.md", stem, n));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Split a leading `# ` heading off the content, returning (title, body).
fn split_heading(content: &str) -> (&str, &str) {
    if let Some(rest) = content.strip_prefix("# ") {
        let (title, body) = rest.split_once('\n').unwrap_or((rest, ""));
        return (title.trim(), body.trim_start_matches('\n'));
    }
    ("", content)
}

fn filename_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .replace('-', " ")
}

pub fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let collapsed: Vec<&str> = slug.split('-').filter(|s| !s.is_empty()).collect();
    let joined = collapsed.join("-");
    if joined.is_empty() {
        "untitled".to_string()
    } else {
        joined
    }
}

/// "just now", "5m ago", "3h ago", "2d ago", then a short date.
pub fn relative_time(t: DateTime<Local>) -> String {
    let mins = Local::now().signed_duration_since(t).num_minutes();
    if mins < 1 {
        return "just now".to_string();
    }
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{}d ago", days);
    }
    t.format("%b %-d").to_string()
}
