pub mod batch;
pub mod catalog;

pub use batch::{BatchFailure, BatchReport, BatchRunner, Confirmation, DeleteOutcome, FileOps};
pub use catalog::CatalogStore;

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Triage state of a single frame. Exactly one value at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Classification {
    #[default]
    Undecided,
    Keep,
    Reject,
}

impl Classification {
    /// The value after applying `value` as a toggle: same class reverts to Undecided
    pub fn toggled(self, value: Classification) -> Classification {
        if self == value {
            Classification::Undecided
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub path: PathBuf,
    pub display_name: String,
    pub classification: Classification,
    /// Set once the file has been moved or deleted; purged on the next compact
    pub moved: bool,
    /// Non-decidable reference frame, carried through untouched
    pub reference: bool,
}

impl CatalogItem {
    pub fn new(path: PathBuf) -> Self {
        let display_name = display_name_of(&path);
        Self {
            path,
            display_name,
            classification: Classification::Undecided,
            moved: false,
            reference: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.moved
    }
}

fn display_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Counts shown in the header and summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageStatistics {
    pub total: usize,
    pub keep: usize,
    pub reject: usize,
    pub undecided: usize,
}

impl TriageStatistics {
    pub fn decided(&self) -> usize {
        self.keep + self.reject
    }
}

/// Sort order for scanned files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Sort by file name
    #[default]
    Name,
    /// Sort by modification date
    Date,
}

/// Options for directory scanning
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Accepted extensions, case-insensitive, leading dot optional
    pub extensions: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Include entries whose name starts with '.'
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub reverse: bool,
}

impl DiscoveryOptions {
    fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

struct ScannedFile {
    path: PathBuf,
    name: String,
    modified_date: DateTime<Utc>,
}

/// Scans `root` for candidate frames.
///
/// # Behavior
/// - Keeps only files whose extension is in `options.extensions`
/// - Skips hidden files and directories unless `show_hidden` is set
/// - Recurses only when `recursive` is set
/// - Skips entries that cannot be read instead of failing the scan
/// - Fails only if `root` itself cannot be read
pub fn discover_files(root: &Path, options: &DiscoveryOptions) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    scan_dir(root, options, &mut files, true)?;

    match options.sort_by {
        SortBy::Name => files.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.path.cmp(&b.path))
        }),
        SortBy::Date => files.sort_by(|a, b| a.modified_date.cmp(&b.modified_date)),
    }

    if options.reverse {
        files.reverse();
    }

    tracing::info!(root = %root.display(), found = files.len(), "directory scan finished");
    Ok(files.into_iter().map(|f| f.path).collect())
}

fn scan_dir(
    dir: &Path,
    options: &DiscoveryOptions,
    files: &mut Vec<ScannedFile>,
    is_root: bool,
) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if is_root => return Err(e),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return Ok(());
        }
    };

    for entry_result in entries {
        let Ok(entry) = entry_result else {
            continue;
        };
        let path = entry.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !options.show_hidden && file_name.starts_with('.') {
            continue;
        }

        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };

        if metadata.is_dir() {
            if options.recursive {
                scan_dir(&path, options, files, false)?;
            }
            continue;
        }

        if !options.accepts(&path) {
            continue;
        }

        let modified_date: DateTime<Utc> = match metadata.modified() {
            Ok(modified) => modified.into(),
            Err(_) => DateTime::<Utc>::MIN_UTC,
        };

        files.push(ScannedFile {
            name: file_name.to_string(),
            path,
            modified_date,
        });
    }

    Ok(())
}
