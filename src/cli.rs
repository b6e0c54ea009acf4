//! CLI domain: parse, route, help, output, and presentation only.
//! No search orchestration; the route table dispatches to the repository API.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{exit_code_for_error, map_error, EXIT_ERROR, EXIT_FOUND, EXIT_NOT_FOUND};
pub use parse::{Cli, Commands};
pub use presentation::{format_entry_json, format_entry_text, format_exists};
pub use route::{CommandOutput, RunContext};
