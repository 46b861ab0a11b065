use super::{CatalogItem, Classification, TriageStatistics};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ordered list of triage candidates.
///
/// Insertion order is navigation order. Paths are unique among active
/// (not yet moved) items; `active_paths` mirrors exactly those.
#[derive(Debug, Default)]
pub struct CatalogStore {
    items: Vec<CatalogItem>,
    active_paths: HashSet<PathBuf>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `path` as Undecided and returns its index.
    ///
    /// Returns `None` without inserting if an active item already has this path.
    pub fn add(&mut self, path: PathBuf) -> Option<usize> {
        if self.active_paths.contains(&path) {
            tracing::debug!(path = %path.display(), "ignoring duplicate catalog entry");
            return None;
        }
        self.active_paths.insert(path.clone());
        self.items.push(CatalogItem::new(path));
        Some(self.items.len() - 1)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.active_paths.clear();
    }

    /// Toggles `value` onto the item: a different class replaces the current
    /// one, the same class reverts to Undecided. `Undecided` clears.
    pub fn set_classification(&mut self, index: usize, value: Classification) {
        let Some(item) = self.checked_mut(index) else {
            return;
        };
        item.classification = match value {
            Classification::Undecided => Classification::Undecided,
            _ => item.classification.toggled(value),
        };
    }

    /// Flags the item for the next compaction. An already moved item is left alone,
    /// its path may belong to a newer active item.
    pub fn mark_moved(&mut self, index: usize) {
        let Some(item) = self.checked_mut(index) else {
            return;
        };
        if item.moved {
            return;
        }
        item.moved = true;
        let path = item.path.clone();
        self.active_paths.remove(&path);
    }

    /// Marks every active item whose path is in `paths`; returns how many matched
    pub fn mark_moved_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> usize {
        let wanted: HashSet<&Path> = paths.iter().map(|p| p.as_ref()).collect();
        let mut marked = 0;
        for item in self.items.iter_mut().filter(|i| i.is_active()) {
            if wanted.contains(item.path.as_path()) {
                item.moved = true;
                self.active_paths.remove(&item.path);
                marked += 1;
            }
        }
        marked
    }

    /// Drops every moved item, keeping survivors in order
    pub fn compact(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.moved);
        let removed = before - self.items.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.items.len(), "catalog compacted");
        }
        removed
    }

    pub fn items_where<F>(&self, predicate: F) -> Vec<&CatalogItem>
    where
        F: Fn(&CatalogItem) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Mutable access for batch operations.
    ///
    /// Callers that set `moved` must follow up with [`CatalogStore::sync_active`].
    pub fn items_mut(&mut self) -> &mut [CatalogItem] {
        &mut self.items
    }

    /// Rebuilds the active-path index after items were flagged through `items_mut`
    pub fn sync_active(&mut self) {
        self.active_paths = self
            .items
            .iter()
            .filter(|item| item.is_active())
            .map(|item| item.path.clone())
            .collect();
    }

    pub fn get(&self, index: usize) -> Option<&CatalogItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn statistics(&self) -> TriageStatistics {
        let mut stats = TriageStatistics::default();
        for item in self.items.iter().filter(|i| i.is_active()) {
            stats.total += 1;
            match item.classification {
                Classification::Keep => stats.keep += 1,
                Classification::Reject => stats.reject += 1,
                Classification::Undecided => stats.undecided += 1,
            }
        }
        stats
    }

    fn checked_mut(&mut self, index: usize) -> Option<&mut CatalogItem> {
        let len = self.items.len();
        debug_assert!(index < len, "catalog index {index} out of range (len {len})");
        if index >= len {
            tracing::warn!(index, len, "rejected out-of-range catalog index");
        }
        self.items.get_mut(index)
    }
}
