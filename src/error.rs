//! Error types shared by the triage core and its default collaborators

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CullError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Render failed for {path}: {reason}")]
    Render { path: PathBuf, reason: String },

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Trash error: {0}")]
    Trash(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl CullError {
    /// Per-file failures that a batch records and then moves past
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            CullError::Io(_)
                | CullError::ImageDecode(_)
                | CullError::Render { .. }
                | CullError::DestinationExists(_)
                | CullError::Trash(_)
        )
    }
}

impl From<image::ImageError> for CullError {
    fn from(e: image::ImageError) -> Self {
        CullError::ImageDecode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CullError>;
