//! Environment source: BLOBTRACE_<SECTION>__<KEY>, e.g. BLOBTRACE_SEARCH__PIPE_CAPACITY

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "BLOBTRACE";

/// Add environment overrides to builder. Highest precedence layer.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
