// Color palette shared by every panel and overlay

use ratatui::style::Color;

/// Reject marks, destructive prompts, errors
pub const ACCENT_PRIMARY: Color = Color::Rgb(235, 94, 85);
/// Keep marks, confirmations, gauges
pub const ACCENT_SECONDARY: Color = Color::Rgb(105, 200, 120);
/// Titles and the current row
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(110, 170, 255);
/// Multi-selected rows
pub const ACCENT_SELECTED: Color = Color::Rgb(225, 190, 90);

pub const TEXT_PRIMARY: Color = Color::Rgb(225, 228, 235);
pub const TEXT_SECONDARY: Color = Color::Rgb(140, 146, 160);

pub const BORDER_COLOR: Color = Color::Rgb(70, 76, 90);
pub const BG_DARK: Color = Color::Rgb(18, 20, 26);
