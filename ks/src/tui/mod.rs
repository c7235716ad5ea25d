//! Menu screens
//!
//! `TuiScreen` owns the terminal (raw mode, alternate screen) while the menu
//! is browsed and hands it back while a tutorial runs. `PlainScreen` prints the
//! same view as text for pipes and dumb terminals.

mod views;

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::{Context, Result};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::display::DisplaySurface;
use crate::selector::MenuView;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Restores the terminal when dropped, including on early return and panic unwind
pub struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore();
    }
}

/// Where the selector draws its menu
pub trait MenuScreen {
    fn draw(&mut self, view: &MenuView) -> Result<()>;

    /// Give the terminal back for line-oriented tutorial I/O
    fn suspend(&mut self) -> Result<()> {
        Ok(())
    }

    /// Take the terminal again after a tutorial
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Full-screen menu rendered with ratatui
pub struct TuiScreen {
    terminal: Tui,
    _guard: TerminalGuard,
}

impl TuiScreen {
    pub fn new() -> Result<Self> {
        debug!("TuiScreen::new: called");
        let guard = TerminalGuard;
        let terminal = init().context("Failed to initialize terminal")?;
        Ok(Self { terminal, _guard: guard })
    }
}

impl MenuScreen for TuiScreen {
    fn draw(&mut self, view: &MenuView) -> Result<()> {
        self.terminal.draw(|frame| views::render(view, frame))?;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        debug!("TuiScreen::suspend: called");
        restore()
    }

    fn resume(&mut self) -> Result<()> {
        debug!("TuiScreen::resume: called");
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        // Force a full repaint; the tutorial scribbled over the screen
        self.terminal.clear()?;
        Ok(())
    }
}

/// Menu printed line by line through a display surface
pub struct PlainScreen {
    display: Box<dyn DisplaySurface>,
}

impl PlainScreen {
    pub fn new(display: Box<dyn DisplaySurface>) -> Self {
        Self { display }
    }
}

impl MenuScreen for PlainScreen {
    fn draw(&mut self, view: &MenuView) -> Result<()> {
        self.display.title_box(&view.title);
        self.display.progress(&view.total_label, view.total_progress);
        for group in &view.groups {
            let marker = if group.selected { "▸" } else { " " };
            self.display.progress(&format!("{} {}", marker, group.label), group.progress);
            for row in &group.tutorials {
                let cursor = if row.cursor { "❯" } else { " " };
                let check = if row.completed { "✓" } else { "○" };
                self.display
                    .instruct(&format!("    {} {} {}  {}", cursor, check, row.name, row.description));
            }
        }
        if let Some(empty) = &view.empty {
            self.display.warn(empty);
        }
        if let Some(notice) = &view.notice {
            self.display.emphasize(notice);
        }
        self.display.instruct(&view.hint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{LineKind, MemoryDisplay};
    use crate::selector::{GroupRow, TutorialRow};

    #[test]
    fn test_plain_screen_lists_cursor_row() {
        let display = MemoryDisplay::new();
        let mut screen = PlainScreen::new(Box::new(display.clone()));
        let view = MenuView {
            title: "Kickstart Tutorials".to_string(),
            total_label: "Total progress".to_string(),
            total_progress: 0.0,
            groups: vec![GroupRow {
                key: "basic".to_string(),
                label: "Getting Started".to_string(),
                description: String::new(),
                progress: 0.0,
                selected: true,
                tutorials: vec![TutorialRow {
                    name: "MakeProject".to_string(),
                    description: "Create a new project with hatch".to_string(),
                    completed: false,
                    cursor: true,
                }],
            }],
            hint: "q quit".to_string(),
            empty: None,
            notice: Some("MakeProject marked complete.".to_string()),
        };

        screen.draw(&view).unwrap();
        screen.suspend().unwrap();
        screen.resume().unwrap();

        assert_eq!(display.of_kind(LineKind::Title), vec!["Kickstart Tutorials"]);
        assert_eq!(display.of_kind(LineKind::Progress).len(), 2);
        assert!(display.contains("❯ ○ MakeProject"));
        assert_eq!(display.of_kind(LineKind::Emphasize), vec!["MakeProject marked complete."]);
    }
}
