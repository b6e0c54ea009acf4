//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, SearchError};

/// A matching revision was found (or the object exists).
pub const EXIT_FOUND: i32 = 0;
/// The search finished without a match (or the object does not exist).
pub const EXIT_NOT_FOUND: i32 = 1;
/// The search could not be completed.
pub const EXIT_ERROR: i32 = 2;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    e.to_string()
}

/// Process exit code for a failed command.
pub fn exit_code_for_error(e: &ApiError) -> i32 {
    match e {
        ApiError::SearchError(SearchError::NotFound { .. }) => EXIT_NOT_FOUND,
        _ => EXIT_ERROR,
    }
}
