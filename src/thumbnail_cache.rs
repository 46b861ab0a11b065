//! Path-keyed cache of rendered thumbnails
//!
//! Entries are filled on demand while browsing or in bulk by [`ThumbnailCache::precompute`].
//! Nothing is evicted automatically; only [`ThumbnailCache::clear`] empties the cache.

use crate::error::Result;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag polled between units of bulk work.
///
/// Clones share the same flag, so a host can keep one while the core runs.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary of one precompute pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecomputeReport {
    pub computed: usize,
    pub skipped_cached: usize,
    pub failed: usize,
    pub canceled: bool,
}

#[derive(Debug)]
pub struct ThumbnailCache<B> {
    entries: HashMap<PathBuf, B>,
}

impl<B> Default for ThumbnailCache<B> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<B> ThumbnailCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup only; never renders
    pub fn get(&self, path: &Path) -> Option<&B> {
        self.entries.get(path)
    }

    pub fn set(&mut self, path: PathBuf, bitmap: B) {
        self.entries.insert(path, bitmap);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        tracing::debug!(dropped, "thumbnail cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached bitmap for `path`, rendering and storing it on a miss.
    ///
    /// A failed render leaves the cache untouched and is returned to the caller.
    pub fn ensure_rendered<R>(&mut self, path: &Path, render: R) -> Result<&B>
    where
        R: FnOnce(&Path) -> Result<B>,
    {
        match self.entries.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => {
                tracing::debug!(path = %path.display(), "thumbnail cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                tracing::debug!(path = %path.display(), "thumbnail cache miss");
                let bitmap = render(path)?;
                Ok(entry.insert(bitmap))
            }
        }
    }

    /// Renders every uncached path in order.
    ///
    /// # Behavior
    /// - `cancel` is polled before each path; once set the loop stops, the
    ///   flag is reset and everything rendered so far stays cached
    /// - A failing render is logged and skipped
    /// - `progress(position + 1, total)` fires after every path, cached and
    ///   failed ones included, so the host can redraw and cancel
    pub fn precompute<R, P>(
        &mut self,
        paths: &[PathBuf],
        mut render: R,
        mut progress: P,
        cancel: &CancelFlag,
    ) -> PrecomputeReport
    where
        R: FnMut(&Path) -> Result<B>,
        P: FnMut(usize, usize),
    {
        let total = paths.len();
        let mut report = PrecomputeReport::default();

        for (position, path) in paths.iter().enumerate() {
            if cancel.is_canceled() {
                cancel.reset();
                report.canceled = true;
                tracing::info!(done = position, total, "precompute canceled");
                break;
            }

            if self.entries.contains_key(path) {
                report.skipped_cached += 1;
            } else {
                match render(path) {
                    Ok(bitmap) => {
                        self.entries.insert(path.clone(), bitmap);
                        report.computed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "precompute render failed");
                        report.failed += 1;
                    }
                }
            }
            progress(position + 1, total);
        }

        tracing::info!(
            computed = report.computed,
            cached = report.skipped_cached,
            failed = report.failed,
            canceled = report.canceled,
            "precompute finished"
        );
        report
    }
}
