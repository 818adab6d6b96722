// src/config.rs

//! Run configuration
//!
//! Built once from the command line and passed by reference to every
//! stage; nothing in the pipeline reads global state.

use crate::error::{Error, Result};
use crate::repository::client::HTTP_TIMEOUT;
use crate::repository::{DownloadOptions, RepositoryBase};
use crate::resolver::MatchMode;
use std::path::PathBuf;
use std::time::Duration;

/// What the run does with the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Print every catalog entry
    List,
    /// Download each `name-ver-rel`, in order
    Download(Vec<String>),
}

/// Immutable settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub repository: RepositoryBase,
    pub mode: Mode,
    /// Replace existing files in `dest_dir`
    pub overwrite: bool,
    pub verbose: bool,
    /// `None` disables the HTTP timeout
    pub timeout: Option<Duration>,
    pub dest_dir: PathBuf,
    pub match_mode: MatchMode,
}

impl Config {
    /// Validate the repository URL and mode selection
    ///
    /// Exactly one of `list` or a non-empty `packages` must be given.
    pub fn new(repo: &str, list: bool, packages: Vec<String>) -> Result<Self> {
        let mode = match (list, packages.is_empty()) {
            (true, true) => Mode::List,
            (false, false) => Mode::Download(packages),
            _ => {
                return Err(Error::InvalidInput(
                    "must specify exactly one of --list or package names to download".to_string(),
                ));
            }
        };

        if repo.trim().is_empty() {
            return Err(Error::InvalidInput("no repo URL given".to_string()));
        }
        let repository = RepositoryBase::parse(repo)?;

        Ok(Self {
            repository,
            mode,
            overwrite: false,
            verbose: false,
            timeout: Some(HTTP_TIMEOUT),
            dest_dir: PathBuf::from("."),
            match_mode: MatchMode::Identity,
        })
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Zero seconds means no timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn with_dest_dir(mut self, dest_dir: impl Into<PathBuf>) -> Self {
        self.dest_dir = dest_dir.into();
        self
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            dest_dir: self.dest_dir.clone(),
            overwrite: self.overwrite,
        }
    }
}
