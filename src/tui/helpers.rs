// Small layout and formatting helpers for the TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use std::time::Duration;

/// Fraction done, 0.0 when there is nothing to do
pub fn calculate_progress(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (done as f64 / total as f64).min(1.0)
    }
}

/// First visible list row that keeps `current` on screen
pub fn list_offset(current: Option<usize>, visible_rows: usize) -> usize {
    match current {
        Some(index) if visible_rows > 0 && index >= visible_rows => index + 1 - visible_rows,
        _ => 0,
    }
}

/// "0.5s", "2s"
pub fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}s", secs as u64)
    } else {
        format!("{:.1}s", secs)
    }
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
