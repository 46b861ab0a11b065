//! Blinkcull - a terminal frame-triage library for astrophotography
//!
//! Load a catalog of frames, blink through them, tag each one keep or
//! reject, then move the tagged groups into their destination folders
//! or delete them. The [`controller::TriageController`] drives all of
//! it and is independent of the terminal front end in [`tui`].

pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod file_opener;
pub mod file_ops;
pub mod logging;
pub mod preview;
pub mod thumbnail_cache;
pub mod tui;

// Re-export primary types for convenience
pub use config::{Settings, UserConfig};
pub use controller::{
    BatchStatus, CommitTarget, Direction, Outcome, PreviewStatus, TriageController, TriageState,
    ViewEvent,
};
pub use domain::{
    discover_files, BatchReport, BatchRunner, CatalogItem, CatalogStore, Classification,
    Confirmation, DiscoveryOptions, FileOps, SortBy, TriageStatistics,
};
pub use error::{CullError, Result};
pub use file_opener::open_file;
pub use file_ops::{DryRunFileOps, HostFileOps, SystemFileOps};
pub use preview::{render_thumbnail, Thumbnail};
pub use thumbnail_cache::{CancelFlag, PrecomputeReport, ThumbnailCache};
