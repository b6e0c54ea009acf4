//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log records (e.g. "find", "exists").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Find { .. } => "find",
        Commands::Exists { .. } => "exists",
    }
}
