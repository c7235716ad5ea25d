//! Menu rendering
//!
//! Draws a `MenuView` and nothing else; all decisions were made when the
//! view was built.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use tracing::trace;

use crate::display::{PROGRESS_WIDTH, progress_bar};
use crate::selector::{GroupRow, MenuView};

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const COMPLETE: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const PENDING: Color = Color::Rgb(255, 215, 0); // Gold
    pub const CURSOR: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const NOTICE: Color = Color::Rgb(255, 215, 0); // Gold
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(view: &MenuView, frame: &mut Frame) {
    trace!(groups = view.groups.len(), "render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Total progress
            Constraint::Min(0),    // Groups
            Constraint::Length(3), // Hint and notice
        ])
        .split(frame.area());

    render_header(view, frame, chunks[0]);
    render_groups(view, frame, chunks[1]);
    render_footer(view, frame, chunks[2]);
}

fn render_header(view: &MenuView, frame: &mut Frame, area: Rect) {
    let ratio = if view.total_progress.is_finite() {
        view.total_progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {} ", view.title),
                    Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
                )),
        )
        .gauge_style(Style::default().fg(colors::COMPLETE).bg(colors::SELECTED_BG))
        .label(format!("{}: {:.0}%", view.total_label, ratio * 100.0))
        .ratio(ratio);
    frame.render_widget(gauge, area);
}

fn group_lines(group: &GroupRow) -> Vec<Line<'static>> {
    let marker = if group.selected { "▸ " } else { "  " };
    let label_style = if group.selected {
        Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let bar_color = progress_color(group.progress);

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{}{}", marker, group.label), label_style),
        Span::raw("  "),
        Span::styled(progress_bar(group.progress, PROGRESS_WIDTH), Style::default().fg(bar_color)),
    ])];

    if !group.selected {
        return lines;
    }

    if !group.description.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    {}", group.description),
            Style::default().fg(colors::DIM),
        )));
    }
    for row in &group.tutorials {
        let (check, check_color) = if row.completed {
            ("✓", colors::COMPLETE)
        } else {
            ("○", colors::DIM)
        };
        let cursor = if row.cursor { "❯" } else { " " };
        let name_style = if row.cursor {
            Style::default().fg(colors::CURSOR).bg(colors::SELECTED_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("    {} ", cursor), Style::default().fg(colors::CURSOR)),
            Span::styled(check, Style::default().fg(check_color)),
            Span::raw(" "),
            Span::styled(row.name.clone(), name_style),
            Span::styled(format!("  {}", row.description), Style::default().fg(colors::DIM)),
        ]));
    }
    lines
}

fn render_groups(view: &MenuView, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for group in &view.groups {
        lines.extend(group_lines(group));
        lines.push(Line::raw(""));
    }
    if let Some(empty) = &view.empty {
        lines.push(Line::from(Span::styled(empty.clone(), Style::default().fg(colors::DIM))));
    }

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(body, area);
}

fn render_footer(view: &MenuView, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(view.hint.clone(), Style::default().fg(colors::HEADER))];
    if let Some(notice) = &view.notice {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(colors::NOTICE)));
    }
    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn progress_color(fraction: f64) -> Color {
    if fraction >= 1.0 {
        colors::COMPLETE
    } else {
        colors::PENDING
    }
}
