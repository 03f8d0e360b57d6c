use crate::app::{App, ChatRole, Focus, Screen};
use crate::controller::{AiKind, Mode, PendingKey};
use crate::store::relative_time;
use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode, size,
    },
};
use std::io::{self, Write, stdout};
use unicode_width::UnicodeWidthStr;

const SIDEBAR_WIDTH: u16 = 28;

/// Owns the terminal for the process lifetime: raw mode and the alternate
/// screen are entered on construction and restored on drop.
pub struct Renderer {
    scroll_offset: usize,
}

impl Renderer {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;
        Ok(Self { scroll_offset: 0 })
    }

    pub fn draw(&mut self, app: &App) -> io::Result<()> {
        let (width, height) = size()?;
        if width < 10 || height < 4 {
            return Ok(());
        }
        let mut out = stdout();
        queue!(out, cursor::Hide, Clear(ClearType::All))?;

        match app.screen {
            Screen::Browser => Self::draw_browser(&mut out, app, width, height)?,
            Screen::Editor => self.draw_editor(&mut out, app, width, height)?,
        }

        out.flush()
    }

    fn draw_editor(&mut self, out: &mut impl Write, app: &App, width: u16, height: u16) -> io::Result<()> {
        let sidebar_width = if app.sidebar.is_some() {
            SIDEBAR_WIDTH.min(width / 3)
        } else {
            0
        };
        let pane_width = if app.ai_pane.is_some() { width * 2 / 5 } else { 0 };
        let body_x = sidebar_width;
        let body_width = (width - sidebar_width - pane_width) as usize;
        let body_height = (height - 2) as usize;

        Self::draw_title(out, app, body_x, body_width)?;
        self.draw_body(out, app, body_x, body_width, body_height)?;
        if let Some(sidebar) = &app.sidebar {
            Self::draw_sidebar(out, sidebar, sidebar_width, height)?;
        }
        if let Some(kind) = app.ai_pane {
            Self::draw_ai_pane(out, app, kind, width - pane_width, pane_width, height)?;
        }
        Self::draw_status_bar(out, app, width, height)?;
        self.place_cursor(out, app, body_x, sidebar_width, pane_width, width)?;
        Ok(())
    }

    fn draw_title(out: &mut impl Write, app: &App, x: u16, width: usize) -> io::Result<()> {
        queue!(out, cursor::MoveTo(x, 0))?;
        let title = app.shared.title.text();
        let shown = if title.is_empty() && app.focus != Focus::Title {
            "Untitled"
        } else {
            title
        };
        if app.focus == Focus::Title {
            let badge = match app.title_controller.mode() {
                Mode::Insert => " [title: insert] ",
                _ => " [title] ",
            };
            queue!(out, SetAttribute(Attribute::Bold))?;
            write!(out, "{}", clip(shown, width.saturating_sub(badge.len())))?;
            queue!(out, SetForegroundColor(Color::Yellow))?;
            write!(out, "{badge}")?;
            queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
        } else {
            queue!(out, SetAttribute(Attribute::Bold))?;
            write!(out, "{}", clip(shown, width))?;
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }

    fn draw_body(
        &mut self,
        out: &mut impl Write,
        app: &App,
        x: u16,
        width: usize,
        rows: usize,
    ) -> io::Result<()> {
        let buffer = &app.shared.buffer;
        let (cursor_line, _) = buffer.cursor();

        // Keep the cursor row inside the viewport.
        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + rows {
            self.scroll_offset = cursor_line + 1 - rows;
        }

        let selection = buffer.selection_range();
        for row in 0..rows {
            let line_idx = self.scroll_offset + row;
            queue!(out, cursor::MoveTo(x, (row + 1) as u16))?;
            let Some(line) = buffer.line(line_idx) else {
                continue;
            };

            match selection {
                Some((start, end)) if line_idx >= start.0 && line_idx <= end.0 => {
                    let chars: Vec<char> = line.chars().collect();
                    let sel_from = if line_idx == start.0 { start.1 } else { 0 };
                    let sel_to = if line_idx == end.0 { end.1 } else { chars.len() };
                    for (col, ch) in chars.iter().take(width).enumerate() {
                        if col >= sel_from && col < sel_to {
                            queue!(
                                out,
                                SetBackgroundColor(Color::DarkGrey),
                                SetForegroundColor(Color::White)
                            )?;
                            write!(out, "{ch}")?;
                            queue!(out, ResetColor)?;
                        } else {
                            write!(out, "{ch}")?;
                        }
                    }
                }
                _ => write!(out, "{}", clip(line, width))?,
            }
        }
        Ok(())
    }

    fn draw_sidebar(
        out: &mut impl Write,
        sidebar: &crate::app::FileBrowser,
        width: u16,
        height: u16,
    ) -> io::Result<()> {
        let inner = width.saturating_sub(2) as usize;
        queue!(out, cursor::MoveTo(0, 0), SetForegroundColor(Color::Cyan))?;
        write!(out, "{}", clip("writings", inner))?;
        queue!(out, ResetColor)?;

        for (i, draft) in sidebar.drafts.iter().enumerate() {
            let row = (i + 1) as u16;
            if row >= height - 1 {
                break;
            }
            queue!(out, cursor::MoveTo(0, row))?;
            let marker = if i == sidebar.selected { "> " } else { "  " };
            if i == sidebar.selected {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            write!(out, "{marker}{}", clip(&draft.title, inner))?;
            if i == sidebar.selected {
                queue!(out, SetAttribute(Attribute::Reset))?;
            }
        }
        if sidebar.confirming_delete {
            queue!(
                out,
                cursor::MoveTo(0, height - 2),
                SetForegroundColor(Color::Red)
            )?;
            write!(out, "{}", clip("delete? y/n", inner))?;
            queue!(out, ResetColor)?;
        }
        Ok(())
    }

    fn draw_ai_pane(
        out: &mut impl Write,
        app: &App,
        kind: AiKind,
        x: u16,
        width: u16,
        height: u16,
    ) -> io::Result<()> {
        let inner = width.saturating_sub(2) as usize;
        let header = match kind {
            AiKind::Discuss => "discuss",
            AiKind::Review => "review",
            AiKind::Polish => "polish",
        };
        queue!(out, cursor::MoveTo(x + 1, 0), SetForegroundColor(Color::Magenta))?;
        write!(out, "{header}")?;
        queue!(out, ResetColor)?;

        let body_rows = (height - 2) as usize;
        let lines: Vec<String> = match kind {
            AiKind::Discuss => {
                let mut lines = Vec::new();
                for entry in &app.chat.entries {
                    let prefix = match entry.role {
                        ChatRole::Writer => "you: ",
                        ChatRole::Companion => "ai: ",
                    };
                    for (i, part) in wrap(&entry.text, inner.saturating_sub(prefix.len())).into_iter().enumerate() {
                        if i == 0 {
                            lines.push(format!("{prefix}{part}"));
                        } else {
                            lines.push(format!("{}{part}", " ".repeat(prefix.len())));
                        }
                    }
                }
                lines
            }
            _ => app
                .pane_output
                .lines()
                .flat_map(|l| wrap(l, inner))
                .collect(),
        };

        // Show the tail when the transcript overflows the pane.
        let input_rows = if kind == AiKind::Discuss { 1 } else { 0 };
        let visible = body_rows.saturating_sub(input_rows);
        let skip = lines.len().saturating_sub(visible);
        for (row, line) in lines.iter().skip(skip).take(visible).enumerate() {
            queue!(out, cursor::MoveTo(x + 1, (row + 1) as u16))?;
            write!(out, "{}", clip(line, inner))?;
        }

        if kind == AiKind::Discuss {
            queue!(out, cursor::MoveTo(x + 1, height - 2))?;
            let marker = if app.focus == Focus::Chat { "> " } else { "  " };
            write!(out, "{marker}{}", clip(&app.chat.input, inner.saturating_sub(2)))?;
        }
        Ok(())
    }

    fn draw_status_bar(out: &mut impl Write, app: &App, width: u16, height: u16) -> io::Result<()> {
        queue!(
            out,
            cursor::MoveTo(0, height - 1),
            SetBackgroundColor(Color::DarkGrey),
            SetForegroundColor(Color::White)
        )?;

        let badge = match (app.focus, app.surface.mode()) {
            (Focus::Title, _) => "TITLE",
            (Focus::Chat, _) => "CHAT",
            (Focus::Sidebar, _) => "FILES",
            (_, Mode::Normal) => "NORMAL",
            (_, Mode::Insert) => "INSERT",
            (_, Mode::Visual) => "VISUAL",
        };
        let hint = match app.surface.pending() {
            PendingKey::LeaderSpace => " [space] d:discuss r:review p:polish n:new b:browse",
            PendingKey::VisualLeaderSpace => " [space] r:review p:polish",
            PendingKey::PrefixD => " d",
            PendingKey::PrefixY => " y",
            PendingKey::PrefixG => " g",
            PendingKey::None => "",
        };
        let whisper = app
            .whisper
            .as_ref()
            .map(|w| format!("  ~ {}", w.text.replace('\n', " ")))
            .unwrap_or_default();

        let left = format!(" {badge}{hint}{whisper}");
        let right = format!(
            "{} wpm | {} words | {} | driftpen ",
            app.stats.wpm(),
            app.shared.buffer.word_count(),
            app.stats.elapsed()
        );

        let total = width as usize;
        let left_width = left.width();
        let right_width = right.width();
        if left_width + right_width < total {
            write!(out, "{left}{}{right}", " ".repeat(total - left_width - right_width))?;
        } else {
            write!(out, "{}", clip(&left, total))?;
        }
        queue!(out, ResetColor)?;
        Ok(())
    }

    fn draw_browser(out: &mut impl Write, app: &App, width: u16, height: u16) -> io::Result<()> {
        let inner = width.saturating_sub(4) as usize;
        queue!(out, cursor::MoveTo(2, 1), SetAttribute(Attribute::Bold))?;
        write!(out, "writings")?;
        queue!(out, SetAttribute(Attribute::Reset))?;

        if app.browser.drafts.is_empty() {
            queue!(out, cursor::MoveTo(2, 3))?;
            write!(out, "no drafts yet. press n to start writing.")?;
        }

        for (i, draft) in app.browser.drafts.iter().enumerate() {
            let row = (i + 3) as u16;
            if row >= height - 1 {
                break;
            }
            queue!(out, cursor::MoveTo(2, row))?;
            let marker = if i == app.browser.selected { "> " } else { "  " };
            let meta = format!(
                "{} words, {}",
                draft.word_count,
                relative_time(draft.modified)
            );
            if i == app.browser.selected {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            write!(out, "{marker}{}", clip(&draft.title, inner.saturating_sub(meta.len() + 4)))?;
            queue!(out, SetForegroundColor(Color::DarkGrey))?;
            write!(out, "  {meta}")?;
            queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
        }

        queue!(
            out,
            cursor::MoveTo(0, height - 1),
            SetBackgroundColor(Color::DarkGrey),
            SetForegroundColor(Color::White)
        )?;
        let bar = if app.browser.confirming_delete {
            " delete selected draft? y to confirm, any other key cancels"
        } else {
            " j/k move | enter open | n new | d delete | esc back | q quit"
        };
        write!(out, "{}", pad(bar, width as usize))?;
        queue!(out, ResetColor)?;
        Ok(())
    }

    fn place_cursor(
        &self,
        out: &mut impl Write,
        app: &App,
        body_x: u16,
        sidebar_width: u16,
        pane_width: u16,
        width: u16,
    ) -> io::Result<()> {
        match app.focus {
            Focus::Title => {
                let col = display_col(app.shared.title.text(), app.shared.title.cursor());
                queue!(out, cursor::MoveTo(body_x + col as u16, 0), cursor::Show)?;
            }
            Focus::Body => {
                let (line, col) = app.shared.buffer.cursor();
                let text = app.shared.buffer.line(line).unwrap_or("");
                let screen_col = display_col(text, col);
                let screen_row = line.saturating_sub(self.scroll_offset) + 1;
                queue!(
                    out,
                    cursor::MoveTo(body_x + screen_col as u16, screen_row as u16),
                    cursor::Show
                )?;
            }
            Focus::Chat => {
                let pane_x = width - pane_width;
                let col = 3 + app.chat.input.width() as u16;
                let (_, height) = size()?;
                queue!(out, cursor::MoveTo(pane_x + col, height - 2), cursor::Show)?;
            }
            // Sidebar selection is drawn with a marker, no terminal cursor.
            Focus::Sidebar => {
                let _ = sidebar_width;
            }
        }
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), cursor::Show, LeaveAlternateScreen);
    }
}

/// Truncate to a display width, char-safe.
fn clip(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

fn pad(text: &str, width: usize) -> String {
    let clipped = clip(text, width);
    let used = clipped.width();
    format!("{clipped}{}", " ".repeat(width.saturating_sub(used)))
}

/// Display column of a char offset within a line.
fn display_col(line: &str, char_col: usize) -> usize {
    line.chars().take(char_col).collect::<String>().width()
}

/// Greedy word wrap to a display width.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
