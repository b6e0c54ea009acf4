//! blobtrace: find the revision that holds a blob at a path
//!
//! Streams every revision of a repository's history into a concurrent scanner
//! that resolves each revision's snapshot, looks up one path, and stops at the
//! first entry whose content hash matches.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod search;
pub mod types;

pub use api::Repository;
pub use error::{ApiError, SearchError};
pub use search::SearchOutcome;
pub use types::{ContentHash, Entry, EntryPath, ObjectType, RevisionId, Snapshot};
