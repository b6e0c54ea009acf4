//! CLI route: single route table and run context. Dispatches to the repository API and presentation.

use crate::api::Repository;
use crate::cli::help::command_name;
use crate::cli::output::{EXIT_FOUND, EXIT_NOT_FOUND};
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_entry_json, format_entry_text, format_exists};
use crate::config::{BlobtraceConfig, ConfigLoader};
use crate::error::{ApiError, SearchError};
use crate::search::SearchOutcome;
use crate::types::{ContentHash, EntryPath};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Text to print and the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

/// Runtime context for CLI execution: repository root and loaded config.
pub struct RunContext {
    repo_root: PathBuf,
    config: BlobtraceConfig,
}

impl RunContext {
    /// Create run context from repository root and optional config path.
    pub fn new(repo_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&repo_root)?,
        };
        let repo_root = config.repository.clone().unwrap_or(repo_root);
        Ok(Self { repo_root, config })
    }

    pub fn with_config(repo_root: PathBuf, config: BlobtraceConfig) -> Self {
        Self { repo_root, config }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn config(&self) -> &BlobtraceConfig {
        &self.config
    }

    /// Run a command against the repository.
    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        let start = Instant::now();
        debug!(command = command_name(command), repo = %self.repo_root.display(), "executing");

        let result = match command {
            Commands::Find {
                hash,
                path,
                format,
                limit_to_path,
            } => self.handle_find(hash, path, format, *limit_to_path).await,
            Commands::Exists { object } => self.handle_exists(object).await,
        };

        info!(
            command = command_name(command),
            ok = result.is_ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "command finished"
        );
        result
    }

    async fn open_repository(&self, limit_to_path: bool) -> Result<Repository, ApiError> {
        let mut search = self.config.search.clone();
        search.limit_to_path |= limit_to_path;
        Repository::open(&self.repo_root, search).await
    }

    async fn handle_find(
        &self,
        hash: &str,
        path: &str,
        format: &str,
        limit_to_path: bool,
    ) -> Result<CommandOutput, ApiError> {
        if format != "text" && format != "json" {
            return Err(ApiError::ConfigError(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                format
            )));
        }
        let target =
            ContentHash::from_hex(hash).map_err(|_| ApiError::InvalidHash(hash.to_string()))?;
        let path = EntryPath::parse(path).map_err(|_| ApiError::InvalidPath(path.to_string()))?;

        let repository = self.open_repository(limit_to_path).await?;
        match repository.find(target, &path).await {
            SearchOutcome::Found(entry) => Ok(CommandOutput {
                text: if format == "json" {
                    format_entry_json(Some(&entry))?
                } else {
                    format_entry_text(&entry)
                },
                exit_code: EXIT_FOUND,
            }),
            SearchOutcome::NotFound => {
                let text = if format == "json" {
                    format_entry_json(None)?
                } else {
                    SearchError::NotFound { hash: target, path }.to_string()
                };
                Ok(CommandOutput {
                    text,
                    exit_code: EXIT_NOT_FOUND,
                })
            }
            SearchOutcome::Failed(e) => Err(ApiError::SearchError(e)),
        }
    }

    async fn handle_exists(&self, object: &str) -> Result<CommandOutput, ApiError> {
        let repository = self.open_repository(false).await?;
        let exists = repository.object_exists(object).await;
        Ok(CommandOutput {
            text: format_exists(exists),
            exit_code: if exists { EXIT_FOUND } else { EXIT_NOT_FOUND },
        })
    }
}
