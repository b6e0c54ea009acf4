//! Merge rules: defaults, override order, conflict handling.

use crate::config::{default_git_binary, default_pipe_capacity};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("search.pipe_capacity", default_pipe_capacity() as u64)?
        .set_default("search.limit_to_path", false)?
        .set_default("search.git_binary", default_git_binary())?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
