use blinkcull::cli::{AppConfig, Args};
use blinkcull::config::{Settings, UserConfig};
use blinkcull::controller::{CommitTarget, Direction, TriageController};
use blinkcull::domain::{discover_files, Confirmation, FileOps};
use blinkcull::file_ops::HostFileOps;
use blinkcull::logging::{init_logging, log_dir};
use blinkcull::preview::{render_thumbnail, Thumbnail};
use blinkcull::tui::{
    self, handle_confirm_input, handle_key_event, handle_mouse_event, KeyAction, MouseAction,
    Overlay, PromptAction, UiState,
};
use blinkcull::{open_file, Result};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::path::Path;
use std::{
    io,
    time::{Duration, Instant},
};

/// Poll interval while nothing is animating
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Convert to config
    let config: AppConfig = args.into();

    let _log_guard = match init_logging(&log_dir(), &config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    run_app_with_config(&config)
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(config: &AppConfig) -> io::Result<()> {
    // Load user configuration, CLI directories override and are remembered
    let mut user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        tracing::warn!(error = %e, "falling back to default config");
        UserConfig::default()
    });
    let changed = config.apply_to(&mut user_config);
    let settings = Settings::new(user_config, UserConfig::config_path());
    if changed {
        settings.persist();
    }

    let discovery_options = config.discovery_options(&settings.config);
    let files = discover_files(&config.directory, &discovery_options)?;
    tracing::info!(
        directory = %config.directory.display(),
        files = files.len(),
        recursive = discovery_options.recursive,
        "discovery finished"
    );

    if files.is_empty() {
        println!(
            "No frames found in directory: {}",
            config.directory.display()
        );
        println!("(Looking for: {})", discovery_options.extensions.join(", "));
        return Ok(());
    }

    let mut controller = TriageController::new(
        settings,
        render_thumbnail,
        HostFileOps::new(config.dry_run),
    );
    controller.load_catalog(files);

    let mut ui = UiState::default();
    if config.dry_run {
        ui.set_status("[DRY RUN] Moves and deletes are only logged");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_loop(&mut terminal, &mut controller, &mut ui, config.precompute);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Print summary after exit
    let stats = controller.statistics();
    let prefix = if controller.file_ops().is_dry_run() {
        "[DRY RUN] "
    } else {
        ""
    };
    println!("\n{}Session complete", prefix);
    println!("   Keep:      {} frames", stats.keep);
    println!("   Reject:    {} frames", stats.reject);
    println!("   Undecided: {} frames", stats.undecided);
    tracing::info!(
        keep = stats.keep,
        reject = stats.reject,
        undecided = stats.undecided,
        "session ended"
    );

    result
}

enum Flow {
    Continue,
    Quit,
}

/// Main application loop
fn run_loop<B, R, F>(
    terminal: &mut Terminal<B>,
    controller: &mut TriageController<Thumbnail, R, F>,
    ui: &mut UiState,
    precompute: bool,
) -> io::Result<()>
where
    B: Backend,
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    if precompute {
        run_precompute(terminal, controller);
        drain_events(controller, ui);
    }

    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| tui::render(frame, controller, ui))?;

        let timeout = if controller.is_playing() {
            controller
                .playback_interval()
                .saturating_sub(last_tick.elapsed())
        } else {
            IDLE_POLL
        };

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Flow::Quit = handle_key(terminal, controller, ui, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) if ui.overlay == Overlay::None => {
                    match handle_mouse_event(mouse, ui.list_area, ui.list_offset) {
                        MouseAction::Select(index) => {
                            controller.select(index);
                        }
                        MouseAction::ToggleSelect(index) => {
                            controller.toggle_selected(index);
                        }
                        MouseAction::None => {}
                    }
                }
                _ => {}
            }
        }

        if controller.is_playing() {
            if last_tick.elapsed() >= controller.playback_interval() {
                controller.playback_tick();
                last_tick = Instant::now();
            }
        } else {
            last_tick = Instant::now();
        }

        drain_events(controller, ui);
    }

    Ok(())
}

fn drain_events<R, F>(controller: &mut TriageController<Thumbnail, R, F>, ui: &mut UiState)
where
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    for event in controller.drain_events() {
        ui.apply_event(event);
    }
}

/// Routes one key press according to the open overlay
fn handle_key<B, R, F>(
    terminal: &mut Terminal<B>,
    controller: &mut TriageController<Thumbnail, R, F>,
    ui: &mut UiState,
    key: KeyEvent,
) -> Flow
where
    B: Backend,
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    match std::mem::take(&mut ui.overlay) {
        Overlay::Help => {
            // Any key closes help
            return Flow::Continue;
        }
        Overlay::ConfirmDelete(count) => {
            let (answer, always) = match handle_confirm_input(key) {
                KeyAction::ConfirmDelete => (Confirmation::Ok, false),
                KeyAction::ConfirmDeleteAlways => (Confirmation::Ok, true),
                KeyAction::CancelDelete => (Confirmation::Cancel, false),
                _ => {
                    ui.overlay = Overlay::ConfirmDelete(count);
                    return Flow::Continue;
                }
            };
            controller.resolve_confirmation(answer, always);
            return Flow::Continue;
        }
        Overlay::DirectoryPrompt { target, mut input } => {
            match input.handle_key(key) {
                PromptAction::Editing => {
                    ui.overlay = Overlay::DirectoryPrompt { target, input };
                }
                PromptAction::Submit(dir) => {
                    let label = commit_label(target);
                    controller.provide_directory(Some(dir), |done, total| {
                        draw_progress(terminal, label, done, total, false);
                        escape_pressed();
                    });
                }
                PromptAction::Cancel => {
                    controller.provide_directory(None, |_, _| {});
                }
            }
            return Flow::Continue;
        }
        Overlay::None => {}
    }

    match handle_key_event(key) {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::Next => {
            controller.navigate(Direction::Next);
        }
        KeyAction::Previous => {
            controller.navigate(Direction::Previous);
        }
        KeyAction::ToggleKeep => {
            controller.toggle_keep();
        }
        KeyAction::ToggleReject => {
            controller.toggle_reject();
        }
        KeyAction::Delete => {
            controller.delete_selected();
        }
        KeyAction::CommitKeep => run_commit(terminal, controller, CommitTarget::Keep),
        KeyAction::CommitReject => run_commit(terminal, controller, CommitTarget::Reject),
        KeyAction::ToggleMark => {
            if let Some(index) = controller.current_index() {
                controller.toggle_selected(index);
            }
        }
        KeyAction::Precompute => run_precompute(terminal, controller),
        KeyAction::TogglePlayback => {
            controller.toggle_playback();
        }
        KeyAction::SpeedUp => {
            controller.speed_up();
        }
        KeyAction::SlowDown => {
            controller.slow_down();
        }
        KeyAction::Open => {
            if let Some(item) = controller.current_item() {
                if let Err(e) = open_file(&item.path) {
                    tracing::warn!(path = %item.path.display(), error = %e, "open failed");
                    ui.set_status(format!("Failed to open file: {}", e));
                }
            }
        }
        KeyAction::ClearAll => {
            controller.clear_all();
        }
        KeyAction::Help => ui.overlay = Overlay::Help,
        KeyAction::ConfirmDelete
        | KeyAction::ConfirmDeleteAlways
        | KeyAction::CancelDelete
        | KeyAction::None => {}
    }

    Flow::Continue
}

fn run_commit<B, R, F>(
    terminal: &mut Terminal<B>,
    controller: &mut TriageController<Thumbnail, R, F>,
    target: CommitTarget,
) where
    B: Backend,
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    let label = commit_label(target);
    controller.commit(target, |done, total| {
        draw_progress(terminal, label, done, total, false);
        // Moves cannot be canceled, input is only drained
        escape_pressed();
    });
}

fn commit_label(target: CommitTarget) -> &'static str {
    match target {
        CommitTarget::Keep => "Moving keepers",
        CommitTarget::Reject => "Moving rejects",
    }
}

/// Renders all thumbnails with a progress screen; Esc cancels between frames
fn run_precompute<B, R, F>(terminal: &mut Terminal<B>, controller: &mut TriageController<Thumbnail, R, F>)
where
    B: Backend,
    R: FnMut(&Path) -> Result<Thumbnail>,
    F: FileOps,
{
    let cancel = controller.cancel_handle();
    draw_progress(terminal, "Rendering thumbnails", 0, controller.items().len(), true);

    controller.precompute_all(|done, total| {
        draw_progress(terminal, "Rendering thumbnails", done, total, true);
        if escape_pressed() {
            cancel.cancel();
        }
    });
}

fn draw_progress<B: Backend>(
    terminal: &mut Terminal<B>,
    label: &str,
    done: usize,
    total: usize,
    cancelable: bool,
) {
    let result = terminal.draw(|frame| {
        tui::render_progress_screen(frame, label, done, total, cancelable)
    });
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to draw progress");
    }
}

/// Drains pending input, reporting whether Esc was among it
fn escape_pressed() -> bool {
    let mut escaped = false;
    while event::poll(Duration::ZERO).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.code == KeyCode::Esc && key.kind == KeyEventKind::Press {
                escaped = true;
            }
        }
    }
    escaped
}
