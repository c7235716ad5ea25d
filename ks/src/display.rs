//! Line-oriented display surface
//!
//! Tutorials and the runner issue semantic render requests (instruction,
//! titled box, styled status line, progress bar) and never write escape
//! sequences themselves.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use colored::*;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use tracing::trace;

/// Width of rendered progress bars, in cells
pub const PROGRESS_WIDTH: usize = 20;

/// Semantic output requests
pub trait DisplaySurface {
    /// Clear the screen
    fn clear(&mut self);

    /// Plain instruction text
    fn instruct(&mut self, text: &str);

    /// Instruction text that should stand out
    fn emphasize(&mut self, text: &str);

    /// A title drawn inside a box
    fn title_box(&mut self, title: &str);

    /// Success line
    fn success(&mut self, text: &str);

    /// Error line
    fn error(&mut self, text: &str);

    /// Warning line
    fn warn(&mut self, text: &str);

    /// A block of code or file content
    fn snippet(&mut self, code: &str);

    /// Labelled progress bar, `fraction` in [0, 1]
    fn progress(&mut self, label: &str, fraction: f64);
}

/// Render `fraction` as a fixed-width bar with a percentage
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        (fraction * 100.0).round() as u32
    )
}

/// Lines of a box drawn around `title`
pub fn boxed(title: &str) -> [String; 3] {
    let width = title.chars().count() + 2;
    [
        format!("╔{}╗", "═".repeat(width)),
        format!("║ {} ║", title),
        format!("╚{}╝", "═".repeat(width)),
    ]
}

/// Colored output on stdout
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySurface for ConsoleDisplay {
    fn clear(&mut self) {
        trace!("ConsoleDisplay::clear: called");
        let mut stdout = io::stdout();
        // Best effort
        let _ = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
    }

    fn instruct(&mut self, text: &str) {
        println!("{}", text);
    }

    fn emphasize(&mut self, text: &str) {
        println!("{}", text.yellow().bold());
    }

    fn title_box(&mut self, title: &str) {
        for line in boxed(title) {
            println!("{}", line.cyan().bold());
        }
    }

    fn success(&mut self, text: &str) {
        println!("{} {}", "✓".green(), text.green());
    }

    fn error(&mut self, text: &str) {
        println!("{} {}", "✗".red(), text.red());
    }

    fn warn(&mut self, text: &str) {
        println!("{} {}", "!".yellow(), text.yellow());
    }

    fn snippet(&mut self, code: &str) {
        println!();
        for line in code.lines() {
            println!("    {}", line.bright_white());
        }
        println!();
    }

    fn progress(&mut self, label: &str, fraction: f64) {
        println!("{} {}", label, progress_bar(fraction, PROGRESS_WIDTH).cyan());
        let _ = io::stdout().flush();
    }
}

/// Kind of a recorded line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Clear,
    Instruct,
    Emphasize,
    Title,
    Success,
    Error,
    Warn,
    Snippet,
    Progress,
}

/// Display that records every request, for non-interactive use and tests
///
/// Clones share one buffer, so a caller can keep a handle while the session
/// owns the boxed display.
#[derive(Debug, Default, Clone)]
pub struct MemoryDisplay {
    lines: Rc<RefCell<Vec<(LineKind, String)>>>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn lines(&self) -> Vec<(LineKind, String)> {
        self.lines.borrow().clone()
    }

    /// True when any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|(_, text)| text.contains(needle))
    }

    /// Recorded lines of one kind
    pub fn of_kind(&self, kind: LineKind) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        self.lines.borrow_mut().push((kind, text.into()));
    }
}

impl DisplaySurface for MemoryDisplay {
    fn clear(&mut self) {
        self.push(LineKind::Clear, "");
    }

    fn instruct(&mut self, text: &str) {
        self.push(LineKind::Instruct, text);
    }

    fn emphasize(&mut self, text: &str) {
        self.push(LineKind::Emphasize, text);
    }

    fn title_box(&mut self, title: &str) {
        self.push(LineKind::Title, title);
    }

    fn success(&mut self, text: &str) {
        self.push(LineKind::Success, text);
    }

    fn error(&mut self, text: &str) {
        self.push(LineKind::Error, text);
    }

    fn warn(&mut self, text: &str) {
        self.push(LineKind::Warn, text);
    }

    fn snippet(&mut self, code: &str) {
        self.push(LineKind::Snippet, code);
    }

    fn progress(&mut self, label: &str, fraction: f64) {
        self.push(LineKind::Progress, format!("{} {}", label, progress_bar(fraction, PROGRESS_WIDTH)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 4), "[░░░░]   0%");
        assert_eq!(progress_bar(1.0, 4), "[████] 100%");
        assert_eq!(progress_bar(0.5, 4), "[██░░]  50%");
    }

    #[test]
    fn test_progress_bar_clamps_bad_input() {
        assert_eq!(progress_bar(7.0, 2), "[██] 100%");
        assert_eq!(progress_bar(-1.0, 2), "[░░]   0%");
        assert_eq!(progress_bar(f64::NAN, 2), "[░░]   0%");
    }

    #[test]
    fn test_boxed_matches_title_width() {
        let [top, mid, bottom] = boxed("안녕 hi");
        assert_eq!(top.chars().count(), mid.chars().count());
        assert_eq!(bottom.chars().count(), mid.chars().count());
    }

    #[test]
    fn test_memory_display_records() {
        let handle = MemoryDisplay::new();
        let mut display = handle.clone();
        display.title_box("Step 1");
        display.error("boom");
        display.progress("Basics", 0.5);

        assert!(handle.contains("boom"));
        assert_eq!(handle.of_kind(LineKind::Title), vec!["Step 1".to_string()]);
        assert!(handle.of_kind(LineKind::Progress)[0].contains("50%"));
        assert_eq!(handle.lines().len(), 3);
    }
}
