use super::{CatalogItem, Classification};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Filesystem primitives a batch is built from. Each call may fail on its own.
pub trait FileOps {
    fn move_file(&mut self, src: &Path, dst: &Path) -> Result<()>;
    fn delete_file(&mut self, path: &Path) -> Result<()>;
}

/// Answer from the yes/no gate before a destructive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Ok,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a best-effort bulk operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Canceled,
    Deleted(BatchReport),
}

/// Commits classification decisions to disk through a [`FileOps`] implementation.
///
/// Failures are recorded per item and never stop the rest of the batch.
/// Successful items get `moved = true`; compacting the catalog afterwards is
/// the caller's job.
#[derive(Debug)]
pub struct BatchRunner<F: FileOps> {
    ops: F,
}

impl<F: FileOps> BatchRunner<F> {
    pub fn new(ops: F) -> Self {
        Self { ops }
    }

    pub fn file_ops(&self) -> &F {
        &self.ops
    }

    /// Moves every active item classified as `classification` to
    /// `target_dir/<display name>`, in catalog order.
    ///
    /// `progress(done, total)` fires after each matching item, whatever its result.
    pub fn move_marked<'a, I, P>(
        &mut self,
        items: I,
        target_dir: &Path,
        classification: Classification,
        mut progress: P,
    ) -> BatchReport
    where
        I: IntoIterator<Item = &'a mut CatalogItem>,
        P: FnMut(usize, usize),
    {
        let mut matching: Vec<&mut CatalogItem> = items
            .into_iter()
            .filter(|item| item.is_active() && item.classification == classification)
            .collect();
        let total = matching.len();
        let mut report = BatchReport::default();

        for item in matching.iter_mut() {
            let destination = target_dir.join(&item.display_name);
            match self.ops.move_file(&item.path, &destination) {
                Ok(()) => {
                    tracing::debug!(
                        src = %item.path.display(),
                        dst = %destination.display(),
                        "moved"
                    );
                    item.moved = true;
                    report.succeeded += 1;
                }
                Err(e) => {
                    if e.is_per_item() {
                        tracing::warn!(path = %item.path.display(), error = %e, "move failed");
                    } else {
                        tracing::error!(path = %item.path.display(), error = %e, "move failed");
                    }
                    report.failures.push(BatchFailure {
                        path: item.path.clone(),
                        message: e.to_string(),
                    });
                }
            }
            report.processed += 1;
            progress(report.processed, total);
        }

        tracing::info!(
            target = %target_dir.display(),
            ?classification,
            moved = report.succeeded,
            failed = report.failed(),
            "move batch finished"
        );
        report
    }

    /// Deletes `items` once `confirm(count)` answers [`Confirmation::Ok`].
    ///
    /// On cancel nothing is touched. Items already moved are skipped.
    pub fn delete_items<'a, I, C, P>(&mut self, items: I, confirm: C, mut progress: P) -> DeleteOutcome
    where
        I: IntoIterator<Item = &'a mut CatalogItem>,
        C: FnOnce(usize) -> Confirmation,
        P: FnMut(usize, usize),
    {
        let mut targets: Vec<&mut CatalogItem> =
            items.into_iter().filter(|item| item.is_active()).collect();
        let total = targets.len();

        if confirm(total) == Confirmation::Cancel {
            tracing::info!(count = total, "delete canceled");
            return DeleteOutcome::Canceled;
        }

        let mut report = BatchReport::default();
        for item in targets.iter_mut() {
            match self.ops.delete_file(&item.path) {
                Ok(()) => {
                    item.moved = true;
                    report.succeeded += 1;
                }
                Err(e) => {
                    if e.is_per_item() {
                        tracing::warn!(path = %item.path.display(), error = %e, "delete failed");
                    } else {
                        tracing::error!(path = %item.path.display(), error = %e, "delete failed");
                    }
                    report.failures.push(BatchFailure {
                        path: item.path.clone(),
                        message: e.to_string(),
                    });
                }
            }
            report.processed += 1;
            progress(report.processed, total);
        }

        tracing::info!(
            deleted = report.succeeded,
            failed = report.failed(),
            "delete batch finished"
        );
        DeleteOutcome::Deleted(report)
    }
}
