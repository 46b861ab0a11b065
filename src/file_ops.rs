//! Default move/delete collaborators

use crate::domain::FileOps;
use crate::error::{CullError, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Real filesystem operations.
///
/// Moves create the destination directory and refuse to overwrite. Deletes
/// go to the system trash unless `use_trash` is off.
#[derive(Debug, Clone)]
pub struct SystemFileOps {
    use_trash: bool,
}

impl Default for SystemFileOps {
    fn default() -> Self {
        Self { use_trash: true }
    }
}

impl SystemFileOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trash(use_trash: bool) -> Self {
        Self { use_trash }
    }
}

impl FileOps for SystemFileOps {
    fn move_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if !src.exists() {
            return Err(CullError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", src.display()),
            )));
        }
        if dst.exists() {
            return Err(CullError::DestinationExists(dst.to_path_buf()));
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }

        if let Err(rename_err) = fs::rename(src, dst) {
            // Cross-device moves cannot be renamed
            tracing::debug!(error = %rename_err, "rename failed, falling back to copy");
            copy_then_remove(src, dst)?;
        }
        Ok(())
    }

    fn delete_file(&mut self, path: &Path) -> Result<()> {
        if self.use_trash {
            trash::delete(path).map_err(|e| CullError::Trash(e.to_string()))
        } else {
            fs::remove_file(path).map_err(CullError::from)
        }
    }
}

/// Copy-based move. A failure at either step removes the destination again,
/// leaving only the source behind.
fn copy_then_remove(src: &Path, dst: &Path) -> io::Result<()> {
    let result = fs::copy(src, dst).and_then(|_| fs::remove_file(src));
    if let Err(e) = result {
        if src.exists() && dst.exists() {
            if let Err(cleanup) = fs::remove_file(dst) {
                tracing::warn!(path = %dst.display(), error = %cleanup, "failed to remove partial copy");
            }
        }
        return Err(e);
    }
    Ok(())
}

/// Logs intended operations without touching the disk
#[derive(Debug, Clone, Default)]
pub struct DryRunFileOps;

impl FileOps for DryRunFileOps {
    fn move_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        tracing::info!(src = %src.display(), dst = %dst.display(), "dry run: would move");
        Ok(())
    }

    fn delete_file(&mut self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "dry run: would delete");
        Ok(())
    }
}

/// Either implementation, picked at startup from the `--dry-run` flag
#[derive(Debug, Clone)]
pub enum HostFileOps {
    System(SystemFileOps),
    DryRun(DryRunFileOps),
}

impl HostFileOps {
    pub fn new(dry_run: bool) -> Self {
        if dry_run {
            HostFileOps::DryRun(DryRunFileOps)
        } else {
            HostFileOps::System(SystemFileOps::new())
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, HostFileOps::DryRun(_))
    }
}

impl FileOps for HostFileOps {
    fn move_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        match self {
            HostFileOps::System(ops) => ops.move_file(src, dst),
            HostFileOps::DryRun(ops) => ops.move_file(src, dst),
        }
    }

    fn delete_file(&mut self, path: &Path) -> Result<()> {
        match self {
            HostFileOps::System(ops) => ops.delete_file(path),
            HostFileOps::DryRun(ops) => ops.delete_file(path),
        }
    }
}
