//! Hand a frame to the desktop's default viewer

use crate::error::{CullError, Result};
use std::path::Path;

/// Opens `path` with the platform default application without waiting for it.
///
/// Used for formats the built-in renderer cannot show (FITS, XISF).
pub fn open_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CullError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    open::that_detached(path)?;
    tracing::info!(path = %path.display(), "opened in external viewer");
    Ok(())
}
