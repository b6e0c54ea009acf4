//! Configuration System
//!
//! Layered configuration for the history search: built-in defaults, the
//! user-level config file, the repository's `.blobtrace.toml`, and finally
//! `BLOBTRACE_*` environment variables. Later layers win.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod loader;
mod merge;
mod sources;

pub use loader::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::repository_file::REPOSITORY_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlobtraceConfig {
    /// Repository to search (defaults to the directory passed on the command line)
    #[serde(default)]
    pub repository: Option<PathBuf>,

    /// Search behavior
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Bytes of revision ids that may sit unread in the pipe before the
    /// listing blocks
    #[serde(default = "default_pipe_capacity")]
    pub pipe_capacity: usize,

    /// Only list revisions that touch the searched path
    #[serde(default)]
    pub limit_to_path: bool,

    /// Git executable
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
}

pub(crate) fn default_pipe_capacity() -> usize {
    64 * 1024
}

pub(crate) fn default_git_binary() -> String {
    "git".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pipe_capacity: default_pipe_capacity(),
            limit_to_path: false,
            git_binary: default_git_binary(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Search(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Search(msg) => write!(f, "Search: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.pipe_capacity == 0 {
            return Err("pipe_capacity must be greater than zero".to_string());
        }
        if self.git_binary.trim().is_empty() {
            return Err("git_binary cannot be empty".to_string());
        }
        Ok(())
    }
}

impl BlobtraceConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.search.validate() {
            errors.push(ValidationError::Search(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
