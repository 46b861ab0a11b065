//! Triage state machine
//!
//! [`TriageController`] owns the catalog, the thumbnail cache and the batch
//! runner, and is the only thing the view talks to. Every command returns
//! whether it was applied; commands that arrive in the wrong state are
//! ignored rather than queued.
//!
//! Prompts are two-phase: a commit without a target directory parks the
//! controller in [`TriageState::AwaitingDirectory`] until
//! [`TriageController::provide_directory`] is called, and a gated delete
//! waits in [`TriageState::AwaitingConfirmation`] for
//! [`TriageController::resolve_confirmation`].

use crate::config::Settings;
use crate::domain::{
    BatchReport, BatchRunner, CatalogItem, CatalogStore, Classification, Confirmation,
    DeleteOutcome, FileOps, TriageStatistics,
};
use crate::error::Result;
use crate::thumbnail_cache::{CancelFlag, PrecomputeReport, ThumbnailCache};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Seconds between frames during blink playback
pub const PLAYBACK_SPEEDS: [f64; 6] = [0.1, 0.3, 0.5, 1.0, 1.5, 2.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageState {
    /// No catalog loaded
    Idle,
    Browsing,
    /// Bulk cache build running; only observable from inside progress callbacks
    Precomputing,
    /// A commit is parked until the user picks a target directory
    AwaitingDirectory(CommitTarget),
    /// A delete is parked until the user answers the yes/no gate
    AwaitingConfirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTarget {
    Keep,
    Reject,
}

impl CommitTarget {
    pub fn classification(self) -> Classification {
        match self {
            CommitTarget::Keep => Classification::Keep,
            CommitTarget::Reject => Classification::Reject,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommitTarget::Keep => "keep",
            CommitTarget::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Whether a command changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

/// Result of a commit or delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Ignored,
    AwaitingDirectory,
    AwaitingConfirmation,
    Canceled,
    Completed(BatchReport),
}

/// State of the preview for the current item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
    Empty,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Move(CommitTarget),
    Delete,
}

/// Notifications for the view; drained with [`TriageController::drain_events`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Refresh,
    SelectionChanged(Option<usize>),
    PreviewFailed { path: PathBuf, message: String },
    DirectoryRequested(CommitTarget),
    ConfirmationRequested(usize),
    BatchFinished { kind: BatchKind, report: BatchReport },
    PrecomputeFinished(PrecomputeReport),
    PlaybackChanged(bool),
}

pub struct TriageController<B, R, F>
where
    R: FnMut(&Path) -> Result<B>,
    F: FileOps,
{
    store: CatalogStore,
    cache: ThumbnailCache<B>,
    render: R,
    runner: BatchRunner<F>,
    settings: Settings,
    state: TriageState,
    current: Option<usize>,
    selected: BTreeSet<usize>,
    preview: PreviewStatus,
    cancel: CancelFlag,
    playing: bool,
    pending_delete: Vec<PathBuf>,
    events: Vec<ViewEvent>,
}

impl<B, R, F> TriageController<B, R, F>
where
    R: FnMut(&Path) -> Result<B>,
    F: FileOps,
{
    pub fn new(settings: Settings, render: R, file_ops: F) -> Self {
        Self {
            store: CatalogStore::new(),
            cache: ThumbnailCache::new(),
            render,
            runner: BatchRunner::new(file_ops),
            settings,
            state: TriageState::Idle,
            current: None,
            selected: BTreeSet::new(),
            preview: PreviewStatus::Empty,
            cancel: CancelFlag::new(),
            playing: false,
            pending_delete: Vec::new(),
            events: Vec::new(),
        }
    }

    // ----- accessors -----

    pub fn state(&self) -> TriageState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_item(&self) -> Option<&CatalogItem> {
        self.current.and_then(|i| self.store.get(i))
    }

    pub fn items(&self) -> &[CatalogItem] {
        self.store.items()
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn preview(&self) -> &PreviewStatus {
        &self.preview
    }

    /// Cached bitmap for the current item, if it has been rendered
    pub fn preview_bitmap(&self) -> Option<&B> {
        self.current_item().and_then(|item| self.cache.get(&item.path))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn file_ops(&self) -> &F {
        self.runner.file_ops()
    }

    pub fn statistics(&self) -> TriageStatistics {
        self.store.statistics()
    }

    pub fn target_directory(&self, target: CommitTarget) -> Option<&Path> {
        match target {
            CommitTarget::Keep => self.settings.config.keep_directory.as_deref(),
            CommitTarget::Reject => self.settings.config.reject_directory.as_deref(),
        }
    }

    pub fn pending_delete_count(&self) -> usize {
        self.pending_delete.len()
    }

    /// Handle a host can keep to cancel a running precompute from its progress callback
    pub fn cancel_handle(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    // ----- catalog -----

    /// Replaces the catalog and starts browsing at index 0
    pub fn load_catalog<I>(&mut self, paths: I) -> Outcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        if !matches!(self.state, TriageState::Idle | TriageState::Browsing) {
            return Outcome::Ignored;
        }

        self.store.clear();
        self.selected.clear();
        for path in paths {
            self.store.add(path);
        }
        tracing::info!(items = self.store.len(), "catalog loaded");

        if self.store.is_empty() {
            self.enter_idle();
        } else {
            self.state = TriageState::Browsing;
            self.set_current(0);
        }
        self.events.push(ViewEvent::Refresh);
        Outcome::Applied
    }

    /// Appends paths without moving the current index; returns how many were new
    pub fn add_files<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        if !matches!(self.state, TriageState::Idle | TriageState::Browsing) {
            return 0;
        }

        let added = paths
            .into_iter()
            .filter_map(|path| self.store.add(path))
            .count();

        if added > 0 {
            tracing::info!(added, total = self.store.len(), "files added");
            if self.state == TriageState::Idle {
                self.state = TriageState::Browsing;
                self.set_current(0);
            }
            self.events.push(ViewEvent::Refresh);
        }
        added
    }

    /// Empties catalog and cache and returns to Idle
    pub fn clear_all(&mut self) -> Outcome {
        if !matches!(self.state, TriageState::Idle | TriageState::Browsing) {
            return Outcome::Ignored;
        }
        self.store.clear();
        self.cache.clear();
        self.enter_idle();
        self.events.push(ViewEvent::Refresh);
        Outcome::Applied
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ----- navigation and selection -----

    /// Moves to the previous/next item with wraparound; clears the multi-selection
    pub fn navigate(&mut self, direction: Direction) -> Outcome {
        if self.state != TriageState::Browsing {
            return Outcome::Ignored;
        }
        self.advance(direction);
        Outcome::Applied
    }

    /// Pointer click: make `index` current and drop the multi-selection
    pub fn select(&mut self, index: usize) -> Outcome {
        if self.state != TriageState::Browsing || index >= self.store.len() {
            return Outcome::Ignored;
        }
        self.selected.clear();
        self.set_current(index);
        Outcome::Applied
    }

    /// Modifier-click: add or remove `index` from the multi-selection
    pub fn toggle_selected(&mut self, index: usize) -> Outcome {
        if self.state != TriageState::Browsing || index >= self.store.len() {
            return Outcome::Ignored;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        self.events.push(ViewEvent::Refresh);
        Outcome::Applied
    }

    // ----- classification -----

    /// Toggles `value` on every index.
    ///
    /// When exactly one item is affected and it is the current one, the
    /// current index advances to the next item.
    pub fn classify(&mut self, indices: &[usize], value: Classification) -> Outcome {
        if self.state != TriageState::Browsing {
            return Outcome::Ignored;
        }
        let targets: BTreeSet<usize> = indices.iter().copied().collect();
        if targets.is_empty() {
            return Outcome::Ignored;
        }

        for &index in &targets {
            self.store.set_classification(index, value);
        }
        tracing::debug!(count = targets.len(), ?value, "classified");
        self.events.push(ViewEvent::Refresh);

        let single_current = targets.len() == 1 && targets.first() == self.current.as_ref();
        if single_current {
            self.advance(Direction::Next);
        }
        Outcome::Applied
    }

    pub fn toggle_keep(&mut self) -> Outcome {
        let targets = self.command_targets();
        self.classify(&targets, Classification::Keep)
    }

    pub fn toggle_reject(&mut self) -> Outcome {
        let targets = self.command_targets();
        self.classify(&targets, Classification::Reject)
    }

    // ----- commit -----

    /// Moves every item classified for `target` into its configured directory.
    ///
    /// Without a directory the commit is parked and a
    /// [`ViewEvent::DirectoryRequested`] is emitted.
    pub fn commit<P>(&mut self, target: CommitTarget, progress: P) -> BatchStatus
    where
        P: FnMut(usize, usize),
    {
        if self.state != TriageState::Browsing {
            return BatchStatus::Ignored;
        }

        match self.target_directory(target).map(Path::to_path_buf) {
            Some(dir) => self.run_commit(target, &dir, progress),
            None => {
                self.stop_playback();
                self.state = TriageState::AwaitingDirectory(target);
                self.events.push(ViewEvent::DirectoryRequested(target));
                tracing::debug!(target = target.label(), "commit waiting for directory");
                BatchStatus::AwaitingDirectory
            }
        }
    }

    /// Answers a parked commit. `None` cancels and leaves the catalog untouched.
    pub fn provide_directory<P>(&mut self, directory: Option<PathBuf>, progress: P) -> BatchStatus
    where
        P: FnMut(usize, usize),
    {
        let TriageState::AwaitingDirectory(target) = self.state else {
            return BatchStatus::Ignored;
        };
        self.state = TriageState::Browsing;

        let Some(dir) = directory else {
            tracing::info!(target = target.label(), "commit canceled");
            self.events.push(ViewEvent::Refresh);
            return BatchStatus::Canceled;
        };

        match target {
            CommitTarget::Keep => self.settings.config.keep_directory = Some(dir.clone()),
            CommitTarget::Reject => self.settings.config.reject_directory = Some(dir.clone()),
        }
        self.settings.persist();

        self.run_commit(target, &dir, progress)
    }

    fn run_commit<P>(&mut self, target: CommitTarget, dir: &Path, progress: P) -> BatchStatus
    where
        P: FnMut(usize, usize),
    {
        self.stop_playback();
        let report = self.runner.move_marked(
            self.store.items_mut().iter_mut(),
            dir,
            target.classification(),
            progress,
        );
        self.store.sync_active();
        self.store.compact();
        self.after_removal();

        self.events.push(ViewEvent::BatchFinished {
            kind: BatchKind::Move(target),
            report: report.clone(),
        });
        BatchStatus::Completed(report)
    }

    // ----- delete -----

    /// Deletes the given items, going through the confirmation gate unless
    /// the user has turned it off.
    pub fn delete(&mut self, indices: &[usize]) -> BatchStatus {
        if self.state != TriageState::Browsing {
            return BatchStatus::Ignored;
        }

        let targets: BTreeSet<usize> = indices.iter().copied().collect();
        let paths: Vec<PathBuf> = targets
            .iter()
            .filter_map(|&i| self.store.get(i))
            .map(|item| item.path.clone())
            .collect();
        if paths.is_empty() {
            return BatchStatus::Ignored;
        }

        if self.settings.config.suppress_delete_confirmation {
            return self.run_delete(&paths, Confirmation::Ok);
        }

        self.stop_playback();
        self.events.push(ViewEvent::ConfirmationRequested(paths.len()));
        self.pending_delete = paths;
        self.state = TriageState::AwaitingConfirmation;
        BatchStatus::AwaitingConfirmation
    }

    /// Deletes the multi-selection, or the current item when nothing is selected
    pub fn delete_selected(&mut self) -> BatchStatus {
        let targets = self.command_targets();
        self.delete(&targets)
    }

    /// Answers a parked delete.
    ///
    /// `dont_ask_again` with [`Confirmation::Ok`] persists the suppression.
    pub fn resolve_confirmation(
        &mut self,
        answer: Confirmation,
        dont_ask_again: bool,
    ) -> BatchStatus {
        if self.state != TriageState::AwaitingConfirmation {
            return BatchStatus::Ignored;
        }
        self.state = TriageState::Browsing;
        let paths = std::mem::take(&mut self.pending_delete);

        if answer == Confirmation::Ok && dont_ask_again {
            self.settings.config.suppress_delete_confirmation = true;
            self.settings.persist();
        }

        self.run_delete(&paths, answer)
    }

    fn run_delete(&mut self, paths: &[PathBuf], answer: Confirmation) -> BatchStatus {
        let wanted: HashSet<&PathBuf> = paths.iter().collect();
        let items = self
            .store
            .items_mut()
            .iter_mut()
            .filter(|item| wanted.contains(&item.path));

        match self.runner.delete_items(items, |_| answer, |_, _| {}) {
            DeleteOutcome::Canceled => {
                self.events.push(ViewEvent::Refresh);
                BatchStatus::Canceled
            }
            DeleteOutcome::Deleted(report) => {
                self.store.sync_active();
                self.store.compact();
                self.after_removal();
                self.events.push(ViewEvent::BatchFinished {
                    kind: BatchKind::Delete,
                    report: report.clone(),
                });
                BatchStatus::Completed(report)
            }
        }
    }

    // ----- precompute -----

    /// Renders every uncached path, calling `progress` after each render.
    ///
    /// Returns `None` when not browsing. Cancel through [`TriageController::cancel_handle`].
    pub fn start_precompute<P>(&mut self, paths: &[PathBuf], progress: P) -> Option<PrecomputeReport>
    where
        P: FnMut(usize, usize),
    {
        if self.state != TriageState::Browsing {
            return None;
        }
        self.stop_playback();
        self.cancel.reset();
        self.state = TriageState::Precomputing;

        let report = self
            .cache
            .precompute(paths, &mut self.render, progress, &self.cancel);

        self.state = TriageState::Browsing;
        self.request_preview();
        self.events.push(ViewEvent::PrecomputeFinished(report.clone()));
        Some(report)
    }

    /// Precomputes every active item in catalog order
    pub fn precompute_all<P>(&mut self, progress: P) -> Option<PrecomputeReport>
    where
        P: FnMut(usize, usize),
    {
        let paths: Vec<PathBuf> = self
            .store
            .items()
            .iter()
            .filter(|item| item.is_active())
            .map(|item| item.path.clone())
            .collect();
        self.start_precompute(&paths, progress)
    }

    pub fn cancel_precompute(&self) {
        self.cancel.cancel();
    }

    // ----- playback -----

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn toggle_playback(&mut self) -> Outcome {
        if self.state != TriageState::Browsing {
            return Outcome::Ignored;
        }
        self.playing = !self.playing;
        tracing::debug!(playing = self.playing, "playback toggled");
        self.events.push(ViewEvent::PlaybackChanged(self.playing));
        Outcome::Applied
    }

    /// Advances one frame when playing; called by the host every [`Self::playback_interval`]
    pub fn playback_tick(&mut self) -> Outcome {
        if !self.playing || self.state != TriageState::Browsing {
            return Outcome::Ignored;
        }
        self.advance(Direction::Next);
        Outcome::Applied
    }

    pub fn playback_speed_index(&self) -> usize {
        self.settings.config.playback_speed.min(PLAYBACK_SPEEDS.len() - 1)
    }

    pub fn playback_interval(&self) -> Duration {
        Duration::from_secs_f64(PLAYBACK_SPEEDS[self.playback_speed_index()])
    }

    pub fn set_playback_speed(&mut self, index: usize) -> Outcome {
        if index >= PLAYBACK_SPEEDS.len() || index == self.settings.config.playback_speed {
            return Outcome::Ignored;
        }
        self.settings.config.playback_speed = index;
        self.settings.persist();
        self.events.push(ViewEvent::Refresh);
        Outcome::Applied
    }

    /// Shorter interval
    pub fn speed_up(&mut self) -> Outcome {
        match self.playback_speed_index().checked_sub(1) {
            Some(index) => self.set_playback_speed(index),
            None => Outcome::Ignored,
        }
    }

    /// Longer interval
    pub fn slow_down(&mut self) -> Outcome {
        self.set_playback_speed(self.playback_speed_index() + 1)
    }

    // ----- internals -----

    fn command_targets(&self) -> Vec<usize> {
        if self.selected.is_empty() {
            self.current.into_iter().collect()
        } else {
            self.selected.iter().copied().collect()
        }
    }

    fn advance(&mut self, direction: Direction) {
        let len = self.store.len();
        let Some(current) = self.current else {
            return;
        };
        if len == 0 {
            return;
        }
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
        };
        self.selected.clear();
        self.set_current(next);
    }

    fn set_current(&mut self, index: usize) {
        self.current = Some(index);
        tracing::debug!(index, "current item changed");
        self.events.push(ViewEvent::SelectionChanged(Some(index)));
        self.request_preview();
    }

    /// Renders the current item through the cache
    fn request_preview(&mut self) {
        let Some(path) = self.current_item().map(|item| item.path.clone()) else {
            self.preview = PreviewStatus::Empty;
            return;
        };

        match self.cache.ensure_rendered(&path, &mut self.render) {
            Ok(_) => self.preview = PreviewStatus::Ready,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "preview failed");
                let message = e.to_string();
                self.preview = PreviewStatus::Failed(message.clone());
                self.events.push(ViewEvent::PreviewFailed { path, message });
            }
        }
    }

    /// Re-anchors the current index after items were compacted away
    fn after_removal(&mut self) {
        let len = self.store.len();
        if len == 0 {
            self.enter_idle();
            return;
        }
        self.selected.clear();
        let index = self.current.unwrap_or(0).min(len - 1);
        self.set_current(index);
        self.events.push(ViewEvent::Refresh);
    }

    fn enter_idle(&mut self) {
        self.state = TriageState::Idle;
        self.current = None;
        self.selected.clear();
        self.preview = PreviewStatus::Empty;
        self.stop_playback();
        self.events.push(ViewEvent::SelectionChanged(None));
    }

    fn stop_playback(&mut self) {
        if self.playing {
            self.playing = false;
            self.events.push(ViewEvent::PlaybackChanged(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use crate::error::CullError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct RecordingOps {
        moves: Vec<(PathBuf, PathBuf)>,
        deletes: Vec<PathBuf>,
        fail_on: HashSet<PathBuf>,
    }

    impl FileOps for RecordingOps {
        fn move_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
            self.moves.push((src.to_path_buf(), dst.to_path_buf()));
            if self.fail_on.contains(src) {
                return Err(CullError::DestinationExists(dst.to_path_buf()));
            }
            Ok(())
        }

        fn delete_file(&mut self, path: &Path) -> Result<()> {
            self.deletes.push(path.to_path_buf());
            if self.fail_on.contains(path) {
                return Err(CullError::Trash("busy".to_string()));
            }
            Ok(())
        }
    }

    type NameRender = fn(&Path) -> Result<String>;
    type TestController = TriageController<String, NameRender, RecordingOps>;

    fn name_render(path: &Path) -> Result<String> {
        Ok(path.display().to_string())
    }

    fn controller_with(config: UserConfig, names: &[&str]) -> TestController {
        let mut controller = TriageController::new(
            Settings::in_memory(config),
            name_render as NameRender,
            RecordingOps::default(),
        );
        controller.load_catalog(names.iter().map(PathBuf::from));
        controller
    }

    fn controller(names: &[&str]) -> TestController {
        controller_with(UserConfig::default(), names)
    }

    fn names(controller: &TestController) -> Vec<&str> {
        controller
            .items()
            .iter()
            .map(|item| item.display_name.as_str())
            .collect()
    }

    fn no_progress(_: usize, _: usize) {}

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_classify_then_commit_keep() {
            let config = UserConfig {
                keep_directory: Some(PathBuf::from("/out")),
                ..Default::default()
            };
            let mut c = controller_with(config, &["a.fits", "b.fits"]);

            assert!(c.classify(&[0], Classification::Keep).is_applied());
            assert_eq!(c.items()[0].classification, Classification::Keep);
            assert_eq!(c.current_index(), Some(1));

            let status = c.commit(CommitTarget::Keep, no_progress);

            assert!(matches!(status, BatchStatus::Completed(ref r) if r.succeeded == 1));
            assert_eq!(
                c.file_ops().moves,
                vec![(PathBuf::from("a.fits"), PathBuf::from("/out/a.fits"))]
            );
            assert_eq!(names(&c), vec!["b.fits"]);
            assert_eq!(c.current_index(), Some(0));
            assert_eq!(c.state(), TriageState::Browsing);
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_new_controller_is_idle() {
            let c = controller(&[]);
            assert_eq!(c.state(), TriageState::Idle);
            assert_eq!(c.current_index(), None);
            assert!(c.current_item().is_none());
        }

        #[test]
        fn test_load_catalog_starts_at_zero_and_renders() {
            let c = controller(&["a.fits", "b.fits"]);

            assert_eq!(c.state(), TriageState::Browsing);
            assert_eq!(c.current_index(), Some(0));
            assert_eq!(c.preview(), &PreviewStatus::Ready);
            assert_eq!(c.preview_bitmap(), Some(&"a.fits".to_string()));
        }

        #[test]
        fn test_load_catalog_dedupes() {
            let c = controller(&["a.fits", "a.fits", "b.fits"]);
            assert_eq!(names(&c), vec!["a.fits", "b.fits"]);
        }

        #[test]
        fn test_reload_resets_index() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.navigate(Direction::Next);

            c.load_catalog(vec![PathBuf::from("c.fits"), PathBuf::from("d.fits")]);

            assert_eq!(c.current_index(), Some(0));
            assert_eq!(names(&c), vec!["c.fits", "d.fits"]);
        }

        #[test]
        fn test_add_files_keeps_index() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.navigate(Direction::Next);

            let added = c.add_files(vec![PathBuf::from("b.fits"), PathBuf::from("c.fits")]);

            assert_eq!(added, 1);
            assert_eq!(c.current_index(), Some(1));
            assert_eq!(names(&c), vec!["a.fits", "b.fits", "c.fits"]);
        }

        #[test]
        fn test_add_files_from_idle_starts_browsing() {
            let mut c = controller(&[]);
            c.add_files(vec![PathBuf::from("a.fits")]);

            assert_eq!(c.state(), TriageState::Browsing);
            assert_eq!(c.current_index(), Some(0));
        }

        #[test]
        fn test_clear_all() {
            let mut c = controller(&["a.fits", "b.fits"]);
            assert_eq!(c.cache_len(), 1);

            assert!(c.clear_all().is_applied());

            assert_eq!(c.state(), TriageState::Idle);
            assert!(c.items().is_empty());
            assert_eq!(c.cache_len(), 0);
            assert_eq!(c.current_index(), None);
        }

        #[test]
        fn test_statistics() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);
            c.classify(&[0], Classification::Keep);
            c.classify(&[1], Classification::Reject);

            let stats = c.statistics();
            assert_eq!((stats.keep, stats.reject, stats.undecided), (1, 1, 1));
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_next_wraps_to_first() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);
            c.select(2);

            c.navigate(Direction::Next);

            assert_eq!(c.current_index(), Some(0));
        }

        #[test]
        fn test_previous_wraps_to_last() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);

            c.navigate(Direction::Previous);

            assert_eq!(c.current_index(), Some(2));
        }

        #[test]
        fn test_single_item_wraps_to_itself() {
            let mut c = controller(&["a.fits"]);
            c.navigate(Direction::Next);
            assert_eq!(c.current_index(), Some(0));
        }

        #[test]
        fn test_navigate_in_idle_is_ignored() {
            let mut c = controller(&[]);
            assert_eq!(c.navigate(Direction::Next), Outcome::Ignored);
        }

        #[test]
        fn test_navigation_renders_each_item_once() {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let log = Rc::clone(&calls);
            let render = move |path: &Path| -> Result<String> {
                log.borrow_mut().push(path.to_path_buf());
                Ok(path.display().to_string())
            };
            let mut c = TriageController::new(
                Settings::default(),
                render,
                RecordingOps::default(),
            );
            c.load_catalog(vec![PathBuf::from("a.fits"), PathBuf::from("b.fits")]);

            c.navigate(Direction::Next);
            c.navigate(Direction::Next);
            c.navigate(Direction::Next);

            assert_eq!(calls.borrow().len(), 2);
            assert_eq!(c.cache_len(), 2);
        }

        #[test]
        fn test_preview_failure_is_reported_not_fatal() {
            let render = |path: &Path| -> Result<String> {
                Err(CullError::Render {
                    path: path.to_path_buf(),
                    reason: "unsupported format".to_string(),
                })
            };
            let mut c = TriageController::new(Settings::default(), render, RecordingOps::default());
            c.load_catalog(vec![PathBuf::from("m31.xisf")]);

            assert!(matches!(c.preview(), PreviewStatus::Failed(m) if m.contains("unsupported")));
            assert!(c
                .drain_events()
                .iter()
                .any(|e| matches!(e, ViewEvent::PreviewFailed { .. })));
            assert_eq!(c.state(), TriageState::Browsing);
            assert_eq!(c.cache_len(), 0);
        }

        #[test]
        fn test_select_and_toggle_selected() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);

            assert!(c.toggle_selected(0).is_applied());
            assert!(c.toggle_selected(2).is_applied());
            assert!(c.is_selected(0) && c.is_selected(2));

            c.toggle_selected(0);
            assert!(!c.is_selected(0));

            c.select(1);
            assert_eq!(c.current_index(), Some(1));
            assert!(c.selected().is_empty());
        }

        #[test]
        fn test_select_out_of_range_is_ignored() {
            let mut c = controller(&["a.fits"]);
            assert_eq!(c.select(3), Outcome::Ignored);
            assert_eq!(c.toggle_selected(3), Outcome::Ignored);
        }

        #[test]
        fn test_navigation_clears_multi_selection() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.toggle_selected(1);

            c.navigate(Direction::Next);

            assert!(c.selected().is_empty());
        }

        #[test]
        fn test_events_are_drained() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.drain_events();

            c.navigate(Direction::Next);

            let events = c.drain_events();
            assert!(events.contains(&ViewEvent::SelectionChanged(Some(1))));
            assert!(c.drain_events().is_empty());
        }
    }

    mod classify_tests {
        use super::*;

        #[test]
        fn test_classify_other_item_does_not_advance() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);

            c.classify(&[2], Classification::Reject);

            assert_eq!(c.current_index(), Some(0));
            assert_eq!(c.items()[2].classification, Classification::Reject);
        }

        #[test]
        fn test_classify_many_does_not_advance() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);

            c.classify(&[0, 1], Classification::Keep);

            assert_eq!(c.current_index(), Some(0));
            assert_eq!(c.statistics().keep, 2);
        }

        #[test]
        fn test_classify_last_wraps() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.select(1);

            c.classify(&[1], Classification::Keep);

            assert_eq!(c.current_index(), Some(0));
        }

        #[test]
        fn test_toggle_keep_uses_current() {
            let mut c = controller(&["a.fits", "b.fits"]);

            c.toggle_keep();
            assert_eq!(c.items()[0].classification, Classification::Keep);
            assert_eq!(c.current_index(), Some(1));

            c.toggle_reject();
            assert_eq!(c.items()[1].classification, Classification::Reject);
        }

        #[test]
        fn test_toggle_keep_twice_on_same_item_reverts() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.toggle_keep();
            c.navigate(Direction::Previous);

            c.toggle_keep();

            assert_eq!(c.items()[0].classification, Classification::Undecided);
        }

        #[test]
        fn test_toggle_reject_uses_multi_selection() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);
            c.toggle_selected(1);
            c.toggle_selected(2);

            c.toggle_reject();

            assert_eq!(c.items()[0].classification, Classification::Undecided);
            assert_eq!(c.items()[1].classification, Classification::Reject);
            assert_eq!(c.items()[2].classification, Classification::Reject);
            assert_eq!(c.current_index(), Some(0));
        }

        #[test]
        fn test_classify_empty_indices_is_ignored() {
            let mut c = controller(&["a.fits"]);
            assert_eq!(c.classify(&[], Classification::Keep), Outcome::Ignored);
        }
    }

    mod commit_tests {
        use super::*;

        #[test]
        fn test_commit_without_directory_waits_then_resumes() {
            let temp_dir = TempDir::new().unwrap();
            let config_path = temp_dir.path().join("config.json");
            let mut c = TriageController::new(
                Settings::new(UserConfig::default(), Some(config_path.clone())),
                name_render as NameRender,
                RecordingOps::default(),
            );
            c.load_catalog(vec![PathBuf::from("a.fits"), PathBuf::from("b.fits")]);
            c.classify(&[1], Classification::Reject);

            let status = c.commit(CommitTarget::Reject, no_progress);
            assert_eq!(status, BatchStatus::AwaitingDirectory);
            assert_eq!(c.state(), TriageState::AwaitingDirectory(CommitTarget::Reject));
            assert!(c
                .drain_events()
                .contains(&ViewEvent::DirectoryRequested(CommitTarget::Reject)));

            let status = c.provide_directory(Some(PathBuf::from("/out/reject")), no_progress);

            assert!(matches!(status, BatchStatus::Completed(ref r) if r.succeeded == 1));
            assert_eq!(c.file_ops().moves[0].1, PathBuf::from("/out/reject/b.fits"));
            assert_eq!(names(&c), vec!["a.fits"]);
            assert_eq!(
                c.target_directory(CommitTarget::Reject),
                Some(Path::new("/out/reject"))
            );
            let saved = UserConfig::load_from(&config_path).unwrap();
            assert_eq!(saved.reject_directory, Some(PathBuf::from("/out/reject")));
        }

        #[test]
        fn test_directory_prompt_cancel_leaves_catalog() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.classify(&[0], Classification::Keep);
            c.commit(CommitTarget::Keep, no_progress);

            let status = c.provide_directory(None, no_progress);

            assert_eq!(status, BatchStatus::Canceled);
            assert_eq!(c.state(), TriageState::Browsing);
            assert_eq!(names(&c), vec!["a.fits", "b.fits"]);
            assert!(c.file_ops().moves.is_empty());
            assert_eq!(c.items()[0].classification, Classification::Keep);
        }

        #[test]
        fn test_commands_ignored_while_awaiting_directory() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.commit(CommitTarget::Keep, no_progress);

            assert_eq!(c.navigate(Direction::Next), Outcome::Ignored);
            assert_eq!(c.classify(&[0], Classification::Keep), Outcome::Ignored);
            assert_eq!(c.delete(&[0]), BatchStatus::Ignored);
            assert_eq!(c.commit(CommitTarget::Reject, no_progress), BatchStatus::Ignored);
            assert_eq!(c.current_index(), Some(0));
        }

        #[test]
        fn test_provide_directory_when_not_waiting_is_ignored() {
            let mut c = controller(&["a.fits"]);
            assert_eq!(
                c.provide_directory(Some(PathBuf::from("/out")), no_progress),
                BatchStatus::Ignored
            );
        }

        #[test]
        fn test_partial_failure_keeps_failed_item() {
            let config = UserConfig {
                keep_directory: Some(PathBuf::from("/out")),
                ..Default::default()
            };
            let mut c = controller_with(config, &["1.fits", "2.fits", "3.fits"]);
            c.classify(&[0, 1, 2], Classification::Keep);
            let mut ops = RecordingOps::default();
            ops.fail_on.insert(PathBuf::from("2.fits"));
            c.runner = BatchRunner::new(ops);

            let status = c.commit(CommitTarget::Keep, no_progress);

            let BatchStatus::Completed(report) = status else {
                panic!("commit should have run");
            };
            assert_eq!(report.succeeded, 2);
            assert_eq!(names(&c), vec!["2.fits"]);
            assert_eq!(c.items()[0].classification, Classification::Keep);
        }

        #[test]
        fn test_commit_clamps_index() {
            let config = UserConfig {
                reject_directory: Some(PathBuf::from("/out")),
                ..Default::default()
            };
            let mut c = controller_with(config, &["a.fits", "b.fits", "c.fits"]);
            c.classify(&[1, 2], Classification::Reject);
            c.select(2);

            c.commit(CommitTarget::Reject, no_progress);

            assert_eq!(names(&c), vec!["a.fits"]);
            assert_eq!(c.current_index(), Some(0));
        }

        #[test]
        fn test_commit_everything_goes_idle() {
            let config = UserConfig {
                keep_directory: Some(PathBuf::from("/out")),
                ..Default::default()
            };
            let mut c = controller_with(config, &["a.fits"]);
            c.classify(&[0], Classification::Keep);

            c.commit(CommitTarget::Keep, no_progress);

            assert_eq!(c.state(), TriageState::Idle);
            assert_eq!(c.current_index(), None);
            assert_eq!(c.preview(), &PreviewStatus::Empty);
        }

        #[test]
        fn test_commit_progress_is_forwarded() {
            let config = UserConfig {
                keep_directory: Some(PathBuf::from("/out")),
                ..Default::default()
            };
            let mut c = controller_with(config, &["a.fits", "b.fits"]);
            c.classify(&[0, 1], Classification::Keep);
            let mut calls = Vec::new();

            c.commit(CommitTarget::Keep, |done, total| calls.push((done, total)));

            assert_eq!(calls, vec![(1, 2), (2, 2)]);
        }
    }

    mod delete_tests {
        use super::*;

        #[test]
        fn test_delete_waits_for_confirmation() {
            let mut c = controller(&["a.fits", "b.fits"]);

            let status = c.delete(&[0]);

            assert_eq!(status, BatchStatus::AwaitingConfirmation);
            assert_eq!(c.state(), TriageState::AwaitingConfirmation);
            assert_eq!(c.pending_delete_count(), 1);
            assert!(c.file_ops().deletes.is_empty());
            assert_eq!(c.navigate(Direction::Next), Outcome::Ignored);
        }

        #[test]
        fn test_confirmed_delete_compacts() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.delete(&[0]);

            let status = c.resolve_confirmation(Confirmation::Ok, false);

            assert!(matches!(status, BatchStatus::Completed(ref r) if r.succeeded == 1));
            assert_eq!(c.file_ops().deletes, vec![PathBuf::from("a.fits")]);
            assert_eq!(names(&c), vec!["b.fits"]);
            assert_eq!(c.state(), TriageState::Browsing);
            assert!(!c.settings().config.suppress_delete_confirmation);
        }

        #[test]
        fn test_declined_delete_changes_nothing() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.delete(&[0, 1]);

            let status = c.resolve_confirmation(Confirmation::Cancel, true);

            assert_eq!(status, BatchStatus::Canceled);
            assert_eq!(names(&c), vec!["a.fits", "b.fits"]);
            assert!(c.file_ops().deletes.is_empty());
            assert!(!c.settings().config.suppress_delete_confirmation);
            assert_eq!(c.state(), TriageState::Browsing);
        }

        #[test]
        fn test_dont_ask_again_is_persisted_and_skips_gate() {
            let temp_dir = TempDir::new().unwrap();
            let config_path = temp_dir.path().join("config.json");
            let mut c = TriageController::new(
                Settings::new(UserConfig::default(), Some(config_path.clone())),
                name_render as NameRender,
                RecordingOps::default(),
            );
            c.load_catalog(vec![
                PathBuf::from("a.fits"),
                PathBuf::from("b.fits"),
                PathBuf::from("c.fits"),
            ]);

            c.delete(&[0]);
            c.resolve_confirmation(Confirmation::Ok, true);
            assert!(UserConfig::load_from(&config_path)
                .unwrap()
                .suppress_delete_confirmation);

            let status = c.delete(&[0]);

            assert!(matches!(status, BatchStatus::Completed(_)));
            assert_eq!(names(&c), vec!["c.fits"]);
        }

        #[test]
        fn test_delete_selected_uses_multi_selection() {
            let config = UserConfig {
                suppress_delete_confirmation: true,
                ..Default::default()
            };
            let mut c = controller_with(config, &["a.fits", "b.fits", "c.fits"]);
            c.toggle_selected(0);
            c.toggle_selected(2);

            c.delete_selected();

            assert_eq!(names(&c), vec!["b.fits"]);
            assert!(c.selected().is_empty());
        }

        #[test]
        fn test_failed_delete_keeps_item() {
            let config = UserConfig {
                suppress_delete_confirmation: true,
                ..Default::default()
            };
            let mut c = controller_with(config, &["a.fits", "b.fits"]);
            let mut ops = RecordingOps::default();
            ops.fail_on.insert(PathBuf::from("a.fits"));
            c.runner = BatchRunner::new(ops);

            let status = c.delete(&[0, 1]);

            let BatchStatus::Completed(report) = status else {
                panic!("delete should have run");
            };
            assert_eq!(report.failed(), 1);
            assert_eq!(names(&c), vec!["a.fits"]);
        }

        #[test]
        fn test_resolve_without_pending_is_ignored() {
            let mut c = controller(&["a.fits"]);
            assert_eq!(
                c.resolve_confirmation(Confirmation::Ok, false),
                BatchStatus::Ignored
            );
        }
    }

    mod precompute_tests {
        use super::*;

        fn frames(count: usize) -> Vec<String> {
            (0..count).map(|i| format!("frame_{:02}.fits", i)).collect()
        }

        #[test]
        fn test_precompute_all_fills_cache() {
            let names = frames(5);
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut c = controller(&refs);

            let report = c.precompute_all(no_progress).unwrap();

            assert_eq!(report.computed, 4);
            assert_eq!(report.skipped_cached, 1);
            assert_eq!(c.cache_len(), 5);
            assert_eq!(c.state(), TriageState::Browsing);
        }

        #[test]
        fn test_cancel_through_handle_stops_after_four() {
            let mut c: TestController = TriageController::new(
                Settings::default(),
                name_render as NameRender,
                RecordingOps::default(),
            );
            c.load_catalog(vec![PathBuf::from("current.fits")]);
            let paths: Vec<PathBuf> = frames(10).into_iter().map(PathBuf::from).collect();
            let handle = c.cancel_handle();

            let report = c
                .start_precompute(&paths, |done, _| {
                    if done == 4 {
                        handle.cancel();
                    }
                })
                .unwrap();

            assert!(report.canceled);
            assert_eq!(report.computed, 4);
            let cached = paths.iter().filter(|p| c.cache.contains(p)).count();
            assert_eq!(cached, 4);
            assert_eq!(c.state(), TriageState::Browsing);
        }

        #[test]
        fn test_stale_cancel_does_not_abort_next_run() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.cancel_precompute();

            let report = c.precompute_all(no_progress).unwrap();

            assert!(!report.canceled);
            assert_eq!(c.cache_len(), 2);
        }

        #[test]
        fn test_precompute_in_idle_is_ignored() {
            let mut c = controller(&[]);
            assert!(c.precompute_all(no_progress).is_none());
        }

        #[test]
        fn test_clear_cache_rerenders_on_next_visit() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.clear_cache();
            assert_eq!(c.cache_len(), 0);

            c.navigate(Direction::Next);

            assert_eq!(c.cache_len(), 1);
        }
    }

    mod playback_tests {
        use super::*;

        #[test]
        fn test_tick_only_advances_while_playing() {
            let mut c = controller(&["a.fits", "b.fits", "c.fits"]);

            assert_eq!(c.playback_tick(), Outcome::Ignored);

            c.toggle_playback();
            assert!(c.is_playing());
            c.playback_tick();
            c.playback_tick();
            c.playback_tick();
            assert_eq!(c.current_index(), Some(0));

            c.toggle_playback();
            assert_eq!(c.playback_tick(), Outcome::Ignored);
        }

        #[test]
        fn test_prompt_stops_playback() {
            let mut c = controller(&["a.fits", "b.fits"]);
            c.toggle_playback();

            c.delete(&[0]);

            assert!(!c.is_playing());
            assert_eq!(c.playback_tick(), Outcome::Ignored);
        }

        #[test]
        fn test_default_interval_is_half_second() {
            let c = controller(&["a.fits"]);
            assert_eq!(c.playback_interval(), Duration::from_millis(500));
        }

        #[test]
        fn test_speed_changes_are_clamped() {
            let mut c = controller(&["a.fits"]);

            assert!(c.set_playback_speed(0).is_applied());
            assert_eq!(c.speed_up(), Outcome::Ignored);
            assert_eq!(c.playback_interval(), Duration::from_millis(100));

            assert!(c.set_playback_speed(PLAYBACK_SPEEDS.len() - 1).is_applied());
            assert_eq!(c.slow_down(), Outcome::Ignored);
            assert_eq!(c.playback_interval(), Duration::from_secs(2));
        }

        #[test]
        fn test_out_of_range_configured_speed_is_clamped() {
            let config = UserConfig {
                playback_speed: 99,
                ..Default::default()
            };
            let c = controller_with(config, &["a.fits"]);
            assert_eq!(c.playback_speed_index(), PLAYBACK_SPEEDS.len() - 1);
        }
    }
}
