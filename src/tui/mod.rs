// TUI module for rendering the terminal interface
pub mod colors;
pub mod helpers;
pub mod input;

// Re-exports
pub use colors::*;
pub use helpers::{calculate_progress, centered_rect, format_interval, list_offset};
pub use input::{
    handle_confirm_input, handle_key_event, handle_mouse_event, KeyAction, MouseAction,
    PromptAction, PromptInput,
};

use crate::controller::{BatchKind, CommitTarget, PreviewStatus, TriageController, ViewEvent};
use crate::domain::{CatalogItem, Classification, FileOps};
use crate::error::Result;
use crate::preview::Thumbnail;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};
use std::path::Path;

/// Overlay drawn on top of the main view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help,
    /// Delete gate for this many frames
    ConfirmDelete(usize),
    DirectoryPrompt {
        target: CommitTarget,
        input: PromptInput,
    },
}

/// View-only state the host keeps between frames
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub overlay: Overlay,
    /// Last event worth telling the user about
    pub status: Option<String>,
    /// Inner rect of the frame list from the last draw, for mouse hit-testing
    pub list_area: Rect,
    /// Catalog index shown on the first list row in the last draw
    pub list_offset: usize,
}

impl UiState {
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Folds a controller notification into overlay and status
    pub fn apply_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Refresh | ViewEvent::SelectionChanged(_) => {}
            ViewEvent::DirectoryRequested(target) => {
                self.overlay = Overlay::DirectoryPrompt {
                    target,
                    input: PromptInput::default(),
                };
            }
            ViewEvent::ConfirmationRequested(count) => {
                self.overlay = Overlay::ConfirmDelete(count);
            }
            other => {
                if let Some(message) = status_message(&other) {
                    self.set_status(message);
                }
            }
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// One-line status text for notifications worth showing
pub fn status_message(event: &ViewEvent) -> Option<String> {
    match event {
        ViewEvent::BatchFinished { kind, report } => {
            let done = match kind {
                BatchKind::Move(target) => format!(
                    "Moved {} frame{} to the {} directory",
                    report.succeeded,
                    plural(report.succeeded),
                    target.label()
                ),
                BatchKind::Delete => format!(
                    "Deleted {} frame{}",
                    report.succeeded,
                    plural(report.succeeded)
                ),
            };
            if report.is_clean() {
                Some(done)
            } else {
                Some(format!("{} ({} failed, see log)", done, report.failed()))
            }
        }
        ViewEvent::PrecomputeFinished(report) if report.canceled => Some(format!(
            "Thumbnail rendering canceled after {}",
            report.computed
        )),
        ViewEvent::PrecomputeFinished(report) => Some(format!(
            "Rendered {} thumbnail{} ({} cached, {} failed)",
            report.computed,
            plural(report.computed),
            report.skipped_cached,
            report.failed
        )),
        ViewEvent::PreviewFailed { path, .. } => Some(format!(
            "No preview for {}",
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        )),
        ViewEvent::PlaybackChanged(true) => Some("Blink playing".to_string()),
        ViewEvent::PlaybackChanged(false) => Some("Blink paused".to_string()),
        _ => None,
    }
}

/// Renders the full view: header, frame list, preview, footer, status line and overlay
pub fn render<R, F>(frame: &mut Frame, controller: &TriageController<Thumbnail, R, F>, ui: &mut UiState)
where
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header with progress
            Constraint::Min(0),    // List and preview
            Constraint::Length(3), // Footer
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    render_header(frame, chunks[0], controller);
    render_body(frame, chunks[1], controller, ui);
    render_footer(frame, chunks[2]);
    render_status(frame, chunks[3], ui);

    match &ui.overlay {
        Overlay::None => {}
        Overlay::Help => render_help_overlay(frame),
        Overlay::ConfirmDelete(count) => render_confirm_delete_overlay(frame, *count),
        Overlay::DirectoryPrompt { target, input } => {
            render_directory_prompt(frame, *target, &input.buffer)
        }
    }
}

/// Full-screen progress box drawn from inside long-running batch callbacks
pub fn render_progress_screen(frame: &mut Frame, label: &str, done: usize, total: usize, cancelable: bool) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", label))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let progress = calculate_progress(done, total);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress)
        .label(format!("{}/{}", done, total));
    frame.render_widget(gauge, rows[1]);

    if cancelable {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Esc to cancel",
            Style::default().fg(TEXT_SECONDARY),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(hint, rows[3]);
    }
}

/// Renders the header with position, counts and the decided gauge
fn render_header<R, F>(frame: &mut Frame, area: Rect, controller: &TriageController<Thumbnail, R, F>)
where
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(2)])
        .split(area);

    let stats = controller.statistics();

    let title_text = match controller.current_index() {
        Some(index) => format!(" Frame {}/{} ", index + 1, controller.items().len()),
        None => " Blinkcull ".to_string(),
    };

    let mut title_spans = vec![Span::styled(
        title_text,
        Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(item) = controller.current_item() {
        title_spans.push(Span::styled(
            item.display_name.clone(),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let playback = if controller.is_playing() {
        format!("▶ {}", format_interval(controller.playback_interval()))
    } else {
        format!("⏸ {}", format_interval(controller.playback_interval()))
    };

    let counts_line = Line::from(vec![
        Span::styled(" ✓ ", Style::default().fg(ACCENT_SECONDARY)),
        Span::raw(format!("{} keep", stats.keep)),
        Span::raw("  "),
        Span::styled("✗ ", Style::default().fg(ACCENT_PRIMARY)),
        Span::raw(format!("{} reject", stats.reject)),
        Span::raw("  "),
        Span::styled("○ ", Style::default().fg(TEXT_SECONDARY)),
        Span::raw(format!("{} undecided", stats.undecided)),
        Span::raw("    "),
        Span::styled(playback, Style::default().fg(TEXT_SECONDARY)),
    ]);

    let header = Paragraph::new(vec![Line::from(title_spans), counts_line])
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, chunks[0]);

    let progress = calculate_progress(stats.decided(), stats.total);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress)
        .label(format!(
            "{}% decided ({}/{})",
            (progress * 100.0) as u16,
            stats.decided(),
            stats.total
        ));

    frame.render_widget(gauge, chunks[1]);
}

fn render_body<R, F>(
    frame: &mut Frame,
    area: Rect,
    controller: &TriageController<Thumbnail, R, F>,
    ui: &mut UiState,
) where
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_frame_list(frame, columns[0], controller, ui);
    render_preview(frame, columns[1], controller);
}

fn item_line(item: &CatalogItem, is_current: bool, is_selected: bool) -> Line<'static> {
    let (mark, mark_style) = match item.classification {
        Classification::Keep => ("✓", Style::default().fg(ACCENT_SECONDARY)),
        Classification::Reject => ("✗", Style::default().fg(ACCENT_PRIMARY)),
        Classification::Undecided => (" ", Style::default()),
    };

    let mut name_style = Style::default().fg(TEXT_PRIMARY);
    if is_selected {
        name_style = name_style.fg(ACCENT_SELECTED);
    }
    if is_current {
        name_style = name_style
            .bg(BORDER_COLOR)
            .add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::styled(if is_current { "▸" } else { " " }, Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::styled(mark, mark_style),
        Span::styled(if is_selected { "•" } else { " " }, Style::default().fg(ACCENT_SELECTED)),
        Span::styled(item.display_name.clone(), name_style),
    ];
    if item.reference {
        spans.push(Span::styled(" [ref]", Style::default().fg(TEXT_SECONDARY)));
    }
    Line::from(spans)
}

fn render_frame_list<R, F>(
    frame: &mut Frame,
    area: Rect,
    controller: &TriageController<Thumbnail, R, F>,
    ui: &mut UiState,
) where
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(" Frames ");
    let inner = block.inner(area);

    let visible = usize::from(inner.height);
    let offset = list_offset(controller.current_index(), visible);
    ui.list_area = inner;
    ui.list_offset = offset;

    let lines: Vec<Line> = controller
        .items()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, item)| {
            item_line(
                item,
                controller.current_index() == Some(index),
                controller.is_selected(index),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_preview<R, F>(frame: &mut Frame, area: Rect, controller: &TriageController<Thumbnail, R, F>)
where
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    let Some(item) = controller.current_item() else {
        frame.render_widget(render_empty_state_widget(), area);
        return;
    };

    match (controller.preview(), controller.preview_bitmap()) {
        (PreviewStatus::Ready, Some(thumbnail)) => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(format!(
                    " {} ({}×{}) ",
                    item.display_name, thumbnail.source_width, thumbnail.source_height
                ));
            let inner = block.inner(area);
            let lines = thumbnail.to_halfblock_lines(inner.width, inner.height);
            frame.render_widget(Paragraph::new(lines).block(block), area);
        }
        (PreviewStatus::Failed(message), _) => {
            let error_lines: Vec<Line> = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  [!] No preview for this frame",
                    Style::default()
                        .fg(ACCENT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!("  {}", message)),
                Line::from(""),
                Line::from(format!("  Path: {}", item.path.display())),
                Line::from(""),
                Line::from(Span::styled(
                    "  Press o to open it in the default viewer",
                    Style::default().fg(TEXT_SECONDARY),
                )),
            ];

            let paragraph = Paragraph::new(error_lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(ACCENT_PRIMARY))
                        .title(format!(" {} [!] ", item.display_name)),
                )
                .style(Style::default().fg(TEXT_PRIMARY))
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        _ => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(format!(" {} ", item.display_name));
            frame.render_widget(block, area);
        }
    }
}

/// Creates an empty state widget for when no frames are loaded
fn render_empty_state_widget() -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "No Frames Loaded",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please choose a directory containing FITS, XISF or image files.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(" Preview "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
}

/// Renders the footer with styled controls
fn render_footer(frame: &mut Frame, area: Rect) {
    let hint = |key: &'static str, label: &'static str, color: Color| {
        [
            Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(label, Style::default().fg(TEXT_SECONDARY)),
            Span::raw("  │  "),
        ]
    };

    let mut spans = Vec::new();
    spans.extend(hint("k ", "Keep", ACCENT_SECONDARY));
    spans.extend(hint("x ", "Reject", ACCENT_PRIMARY));
    spans.extend(hint("↑↓ ", "Navigate", TEXT_SECONDARY));
    spans.extend(hint("m/M ", "Commit", ACCENT_HIGHLIGHT));
    spans.extend(hint("Space ", "Blink", TEXT_SECONDARY));
    spans.extend(hint("? ", "Help", TEXT_SECONDARY));
    spans.push(Span::styled("q ", Style::default().fg(TEXT_SECONDARY)));
    spans.push(Span::styled("Quit", Style::default().fg(TEXT_SECONDARY)));

    let footer = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

fn render_status(frame: &mut Frame, area: Rect, ui: &UiState) {
    let text = ui.status.as_deref().unwrap_or("");
    let status = Paragraph::new(Line::from(Span::styled(
        format!(" {}", text),
        Style::default().fg(TEXT_SECONDARY),
    )));
    frame.render_widget(status, area);
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();
    let help_area = centered_rect(60, 80, area);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |keys: &'static str, what: &'static str, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:>10}  ", keys), Style::default().fg(color)),
            Span::raw(format!("{:<28}", what)),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        entry("↑ ↓", "Previous / next frame", TEXT_SECONDARY),
        entry("k", "Toggle keep", ACCENT_SECONDARY),
        entry("x", "Toggle reject", ACCENT_PRIMARY),
        entry("Del", "Delete to trash", ACCENT_PRIMARY),
        entry("m", "Move keepers to keep dir", ACCENT_HIGHLIGHT),
        entry("M", "Move rejects to reject dir", ACCENT_HIGHLIGHT),
        entry("v", "Mark / unmark for group", ACCENT_SELECTED),
        entry("Space", "Blink play / pause", TEXT_SECONDARY),
        entry("+ -", "Blink faster / slower", TEXT_SECONDARY),
        entry("p", "Render all thumbnails", TEXT_SECONDARY),
        entry("o", "Open in default viewer", TEXT_SECONDARY),
        entry("C", "Clear all", TEXT_SECONDARY),
        entry("q Esc", "Quit", TEXT_SECONDARY),
        Line::from(""),
        Line::from(Span::styled(
            "Click selects a frame, Ctrl+click marks it",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

/// Renders the confirmation dialog for deletes
pub fn render_confirm_delete_overlay(frame: &mut Frame, count: usize) {
    let area = frame.area();
    let confirm_area = centered_rect(50, 50, area);

    frame.render_widget(Clear, confirm_area);

    let block = Block::default()
        .title(" ⚠ Confirm Delete ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_PRIMARY))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(confirm_area);
    frame.render_widget(block, confirm_area);

    let what = if count == 1 {
        "this frame".to_string()
    } else {
        format!("{} frames", count)
    };

    let confirm_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Delete {}?", what),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Files are moved to the system trash.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Y]", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("es  "),
            Span::styled("[A]", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("lways  "),
            Span::styled("[N]", Style::default().fg(ACCENT_PRIMARY)),
            Span::raw("o"),
        ]),
    ];

    let paragraph = Paragraph::new(confirm_lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

/// Renders the text prompt asking where a commit should go
pub fn render_directory_prompt(frame: &mut Frame, target: CommitTarget, buffer: &str) {
    let area = centered_rect(70, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" Choose {} directory ", target.label()))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" > ", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled(buffer.to_string(), Style::default().fg(TEXT_PRIMARY)),
            Span::styled("█", Style::default().fg(ACCENT_HIGHLIGHT)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Enter to move, Esc to cancel",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}
