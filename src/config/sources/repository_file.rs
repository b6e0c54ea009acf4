//! Repository config file source: <repository>/.blobtrace.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;
use tracing::debug;

/// File name looked up at the repository root.
pub const REPOSITORY_CONFIG_FILE: &str = ".blobtrace.toml";

/// Add the repository config file to builder when present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    repository: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let config_path = repository.join(REPOSITORY_CONFIG_FILE);
    if !config_path.exists() {
        return Ok(builder);
    }
    debug!(config_path = %config_path.display(), "Loading repository configuration");
    Ok(builder.add_source(File::from(config_path.as_path()).required(false)))
}
