use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RcConfig {
    pub model: String,
    pub idle_timeout: Duration,
    pub whisper_rate_limit: Duration,
    pub writings_dir: Option<PathBuf>,
    pub ai_enabled: bool,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            idle_timeout: Duration::from_secs(3),
            whisper_rate_limit: Duration::from_secs(45),
            writings_dir: None,
            ai_enabled: true,
        }
    }
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .driftpenrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.driftpenrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(".driftpenrc");
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(".driftpenrc");
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load and parse the RC file
    pub fn load_config() -> RcConfig {
        let mut config = RcConfig::default();

        if let Some(rc_path) = Self::get_rc_path() {
            match fs::read_to_string(&rc_path) {
                Ok(content) => {
                    tracing::debug!(path = %rc_path.display(), "loading rc file");
                    Self::parse_config_content(&content, &mut config);
                }
                Err(_) => {
                    // Silently fail if we can't read the file
                }
            }
        }

        config
    }

    /// Parse the content of an RC file
    fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    /// Parse a single configuration line
    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = if let Some(pos) = line.find('#') {
            &line[..pos]
        } else {
            line
        }
        .trim();

        // "set key=value" and bare "key=value" are both accepted
        let line = line.strip_prefix("set ").unwrap_or(line).trim();

        let Some((key, value)) = line.split_once('=') else {
            return;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "model" => {
                if !value.is_empty() {
                    config.model = value.to_string();
                }
            }
            "idle_timeout" | "idletimeout" => {
                if let Ok(secs) = value.parse::<u64>() {
                    if secs >= 1 && secs <= 600 {
                        config.idle_timeout = Duration::from_secs(secs);
                    }
                }
            }
            "whisper_rate_limit" | "whisperratelimit" => {
                if let Ok(secs) = value.parse::<u64>() {
                    if secs >= 1 {
                        config.whisper_rate_limit = Duration::from_secs(secs);
                    }
                }
            }
            "writings_dir" | "writingsdir" => {
                if !value.is_empty() {
                    config.writings_dir = Some(PathBuf::from(value));
                }
            }
            "ai" | "ai_enabled" => {
                config.ai_enabled = value == "true" || value == "1" || value == "yes" || value == "on";
            }
            _ => {} // Unknown setting, ignore
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# driftpen configuration file (.driftpenrc)
# Lines starting with # or " are comments

# AI settings
set model=claude-sonnet-4-20250514
set ai=on                     # Disable all AI features with ai=off

# Idle whisper
set idle_timeout=3            # Seconds of stillness before a whisper fires
set whisper_rate_limit=45     # Minimum seconds between whispers

# Storage
# set writings_dir=/path/to/writings
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_style_config() {
        let mut config = RcConfig::default();
        let content = r#"
            set model=claude-test
            set idle_timeout=5
            set whisper_rate_limit=90
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert_eq!(config.model, "claude-test");
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.whisper_rate_limit, Duration::from_secs(90));
    }

    #[test]
    fn test_parse_key_value_config() {
        let mut config = RcConfig::default();
        let content = r#"
            writings_dir=/tmp/drafts
            ai=off
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert_eq!(config.writings_dir, Some(PathBuf::from("/tmp/drafts")));
        assert!(!config.ai_enabled);
    }

    #[test]
    fn test_parse_mixed_config_with_comments() {
        let mut config = RcConfig::default();
        let content = r#"
            # This is a comment
            set idle_timeout=10    # Slower whispers
            " This is also a comment

            # set model=commented-out
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert_eq!(config.idle_timeout, Duration::from_secs(10));
        assert_eq!(config.model, RcConfig::default().model);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let mut config = RcConfig::default();
        let content = r#"
            set idle_timeout=0        # Invalid: too small
            idle_timeout=9999         # Invalid: too large
            whisper_rate_limit=nope   # Invalid: not a number
            unknown_setting=value     # Unknown setting
            model=
        "#;

        RcLoader::parse_config_content(content, &mut config);

        let defaults = RcConfig::default();
        assert_eq!(config.idle_timeout, defaults.idle_timeout);
        assert_eq!(config.whisper_rate_limit, defaults.whisper_rate_limit);
        assert_eq!(config.model, defaults.model);
    }
}
