//! CLI parse: clap types for blobtrace. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// blobtrace - find the revision holding a blob at a path
#[derive(Parser, Debug)]
#[command(name = "blobtrace")]
#[command(about = "Find the revision in a repository's history that holds a given blob at a given path")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root directory
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the first listed revision whose snapshot holds HASH at PATH
    Find {
        /// Blob hash (hex object id)
        hash: String,
        /// Path inside the repository, relative to its root
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Only list revisions that touch PATH
        #[arg(long)]
        limit_to_path: bool,
    },
    /// Check whether an object exists
    Exists {
        /// Object name (hash or revision)
        object: String,
    },
}
