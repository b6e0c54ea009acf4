//! Config loader: assembles the layered sources and validates the result.

use super::merge::merge_policy;
use super::sources::{environment, global_file, repository_file};
use super::BlobtraceConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Loads [`BlobtraceConfig`] from defaults, files, and environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a repository.
    ///
    /// Precedence (highest to lowest):
    /// 1. `BLOBTRACE_*` environment variables
    /// 2. `<repository>/.blobtrace.toml`
    /// 3. global config file
    /// 4. defaults
    pub fn load(repository: &Path) -> Result<BlobtraceConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = repository_file::add_to_builder(builder, repository)?;
        let builder = environment::add_to_builder(builder);

        let mut config: BlobtraceConfig = builder.build()?.try_deserialize()?;
        if config.repository.is_none() {
            config.repository = Some(repository.to_path_buf());
        }
        Self::validated(config)
    }

    /// Load configuration from an explicit file, still honoring environment overrides.
    pub fn load_from_file(path: &Path) -> Result<BlobtraceConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);

        let config: BlobtraceConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    fn validated(config: BlobtraceConfig) -> Result<BlobtraceConfig, ApiError> {
        if let Err(errors) = config.validate() {
            let joined = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::ConfigError(joined));
        }
        debug!(
            pipe_capacity = config.search.pipe_capacity,
            limit_to_path = config.search.limit_to_path,
            "Configuration loaded"
        );
        Ok(config)
    }
}
