use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::path::PathBuf;

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Move to next frame
    Next,
    /// Move to previous frame
    Previous,
    /// Toggle keep on current/selected frames
    ToggleKeep,
    /// Toggle reject on current/selected frames
    ToggleReject,
    /// Delete current/selected frames
    Delete,
    /// Move every keeper to the keep directory
    CommitKeep,
    /// Move every reject to the reject directory
    CommitReject,
    /// Add or remove the current frame from the multi-selection
    ToggleMark,
    /// Render all thumbnails now
    Precompute,
    /// Start or stop blink playback
    TogglePlayback,
    /// Shorter playback interval
    SpeedUp,
    /// Longer playback interval
    SlowDown,
    /// Open current frame in the default viewer
    Open,
    /// Empty the catalog and the cache
    ClearAll,
    /// Toggle help overlay
    Help,
    /// Delete confirmed
    ConfirmDelete,
    /// Delete confirmed, stop asking
    ConfirmDeleteAlways,
    /// Delete declined
    CancelDelete,
    /// No action
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    // Shifted letters arrive with SHIFT set on some terminals and not others
    let modifiers = key.modifiers.difference(KeyModifiers::SHIFT);

    match (key.code, modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Navigation
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Previous,

        // Classification
        (KeyCode::Char('k') | KeyCode::Char('K'), KeyModifiers::NONE) => KeyAction::ToggleKeep,
        (KeyCode::Char('x') | KeyCode::Char('X'), KeyModifiers::NONE) => KeyAction::ToggleReject,
        (KeyCode::Backspace | KeyCode::Delete, KeyModifiers::NONE) => KeyAction::Delete,

        // Commit
        (KeyCode::Char('m'), KeyModifiers::NONE) => KeyAction::CommitKeep,
        (KeyCode::Char('M'), KeyModifiers::NONE) => KeyAction::CommitReject,

        (KeyCode::Char('v'), KeyModifiers::NONE) => KeyAction::ToggleMark,
        (KeyCode::Char('p'), KeyModifiers::NONE) => KeyAction::Precompute,

        // Playback
        (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::TogglePlayback,
        (KeyCode::Char('+') | KeyCode::Char('='), KeyModifiers::NONE) => KeyAction::SpeedUp,
        (KeyCode::Char('-'), KeyModifiers::NONE) => KeyAction::SlowDown,

        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,
        (KeyCode::Char('C'), KeyModifiers::NONE) => KeyAction::ClearAll,

        // Help: ?
        (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events to confirmation actions
/// Used while a delete is waiting for an answer
pub fn handle_confirm_input(key: KeyEvent) -> KeyAction {
    let modifiers = key.modifiers.difference(KeyModifiers::SHIFT);

    match (key.code, modifiers) {
        // Confirm: y or Enter
        (KeyCode::Char('y') | KeyCode::Char('Y'), KeyModifiers::NONE) => KeyAction::ConfirmDelete,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::ConfirmDelete,

        // Confirm and stop asking: a
        (KeyCode::Char('a') | KeyCode::Char('A'), KeyModifiers::NONE) => {
            KeyAction::ConfirmDeleteAlways
        }

        // Cancel: n or Esc
        (KeyCode::Char('n') | KeyCode::Char('N'), KeyModifiers::NONE) => KeyAction::CancelDelete,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::CancelDelete,

        _ => KeyAction::None,
    }
}

/// Text entry for the target-directory prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptInput {
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    Editing,
    Submit(PathBuf),
    Cancel,
}

impl PromptInput {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            buffer: text.into(),
        }
    }

    /// Applies one key to the buffer. Enter on a blank buffer keeps editing.
    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        match key.code {
            KeyCode::Esc => PromptAction::Cancel,
            KeyCode::Enter => {
                let text = self.buffer.trim();
                if text.is_empty() {
                    PromptAction::Editing
                } else {
                    PromptAction::Submit(expand_home(text))
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                PromptAction::Editing
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.push(c);
                PromptAction::Editing
            }
            _ => PromptAction::Editing,
        }
    }
}

fn expand_home(text: &str) -> PathBuf {
    match (text.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(text),
    }
}

/// Result of a mouse event over the frame list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    /// Plain click: make the row current
    Select(usize),
    /// Ctrl+click: toggle the row in the multi-selection
    ToggleSelect(usize),
    None,
}

/// Maps a left click inside `list_area` (the list's inner rect) to a catalog index.
///
/// `offset` is the catalog index drawn on the first row.
pub fn handle_mouse_event(mouse: MouseEvent, list_area: Rect, offset: usize) -> MouseAction {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return MouseAction::None;
    }

    let inside_x = mouse.column >= list_area.x && mouse.column < list_area.x + list_area.width;
    let inside_y = mouse.row >= list_area.y && mouse.row < list_area.y + list_area.height;
    if !inside_x || !inside_y {
        return MouseAction::None;
    }

    let index = offset + usize::from(mouse.row - list_area.y);
    if mouse.modifiers.contains(KeyModifiers::CONTROL) {
        MouseAction::ToggleSelect(index)
    } else {
        MouseAction::Select(index)
    }
}
