// CLI module for argument parsing and configuration

use crate::config::UserConfig;
use crate::domain::{DiscoveryOptions, SortBy};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Blinkcull - blink through astronomical frames and cull the bad ones
///
/// Tag each frame keep or reject, then move the keepers and rejects into their own folders.
#[derive(Parser, Debug, Clone)]
#[command(name = "blinkcull")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to scan for frames
    ///
    /// If not specified, defaults to the current directory.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Scan subdirectories too
    #[arg(short = 'R', long = "recursive", action = ArgAction::SetTrue)]
    pub recursive: bool,

    /// File extension to include (repeatable)
    ///
    /// Replaces the configured extension list for this run.
    /// Example: --ext fits --ext xisf
    #[arg(short = 'e', long = "ext")]
    pub extensions: Vec<String>,

    /// Destination for frames committed as keep (saved to config)
    #[arg(long = "keep-dir")]
    pub keep_dir: Option<PathBuf>,

    /// Destination for frames committed as reject (saved to config)
    #[arg(long = "reject-dir")]
    pub reject_dir: Option<PathBuf>,

    /// Sort frames by specified criteria
    #[arg(short = 's', long = "sort", value_enum, default_value = "name")]
    pub sort_by: SortOrder,

    /// Reverse sort order
    #[arg(short = 'r', long = "reverse", action = ArgAction::SetTrue)]
    pub reverse: bool,

    /// Show hidden files (files starting with .)
    #[arg(long = "hidden", action = ArgAction::SetTrue)]
    pub show_hidden: bool,

    /// Dry run mode - log moves and deletes without touching any file
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Render every thumbnail before browsing starts
    #[arg(short = 'p', long = "precompute", action = ArgAction::SetTrue)]
    pub precompute: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SortOrder {
    /// Sort by file name (alphabetical)
    #[default]
    Name,
    /// Sort by modification date (oldest first)
    Date,
}

impl From<SortOrder> for SortBy {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Name => SortBy::Name,
            SortOrder::Date => SortBy::Date,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }

        if !self.directory.is_dir() {
            return Err(format!(
                "Path is not a directory: {}",
                self.directory.display()
            ));
        }

        for (label, dir) in [("keep-dir", &self.keep_dir), ("reject-dir", &self.reject_dir)] {
            if let Some(dir) = dir {
                if dir.exists() && !dir.is_dir() {
                    return Err(format!("{} is not a directory: {}", label, dir.display()));
                }
            }
        }

        if self.extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
            return Err("Empty extension given to --ext".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory: PathBuf,
    pub recursive: bool,
    pub extensions: Option<Vec<String>>,
    pub keep_dir: Option<PathBuf>,
    pub reject_dir: Option<PathBuf>,
    pub sort_by: SortOrder,
    pub reverse: bool,
    pub show_hidden: bool,
    pub dry_run: bool,
    pub precompute: bool,
    pub log_level: String,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            directory: args.directory,
            recursive: args.recursive,
            extensions: if args.extensions.is_empty() {
                None
            } else {
                Some(args.extensions)
            },
            keep_dir: args.keep_dir,
            reject_dir: args.reject_dir,
            sort_by: args.sort_by,
            reverse: args.reverse,
            show_hidden: args.show_hidden,
            dry_run: args.dry_run,
            precompute: args.precompute,
            log_level: args.log_level,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            directory: PathBuf::from("."),
            recursive: false,
            extensions: None,
            keep_dir: None,
            reject_dir: None,
            sort_by: SortOrder::Name,
            reverse: false,
            show_hidden: false,
            dry_run: false,
            precompute: false,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Copies the persisted overrides (keep/reject directories) into `user`.
    ///
    /// Returns true when something changed and the config should be saved.
    pub fn apply_to(&self, user: &mut UserConfig) -> bool {
        let mut changed = false;
        if let Some(dir) = &self.keep_dir {
            if user.keep_directory.as_ref() != Some(dir) {
                user.keep_directory = Some(dir.clone());
                changed = true;
            }
        }
        if let Some(dir) = &self.reject_dir {
            if user.reject_directory.as_ref() != Some(dir) {
                user.reject_directory = Some(dir.clone());
                changed = true;
            }
        }
        changed
    }

    /// Scan options for this run; CLI extensions win over the configured list
    pub fn discovery_options(&self, user: &UserConfig) -> DiscoveryOptions {
        DiscoveryOptions {
            extensions: self
                .extensions
                .clone()
                .unwrap_or_else(|| user.extensions.clone()),
            recursive: self.recursive || user.recursive,
            show_hidden: self.show_hidden,
            sort_by: self.sort_by.into(),
            reverse: self.reverse,
        }
    }
}
