//! Search outcome and the reconciliation of producer and scanner results.

use crate::error::{SearchError, SourceFailure};
use crate::search::scanner::ScanReport;
use crate::types::{ContentHash, Entry, EntryPath};

/// Result of one history search.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(Entry),
    NotFound,
    Failed(SearchError),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn entry(&self) -> Option<&Entry> {
        match self {
            SearchOutcome::Found(entry) => Some(entry),
            _ => None,
        }
    }

    /// Collapse into a `Result`, turning `NotFound` into
    /// [`SearchError::NotFound`] for the searched hash and path.
    pub fn into_result(self, hash: ContentHash, path: &EntryPath) -> Result<Entry, SearchError> {
        match self {
            SearchOutcome::Found(entry) => Ok(entry),
            SearchOutcome::NotFound => Err(SearchError::NotFound {
                hash,
                path: path.clone(),
            }),
            SearchOutcome::Failed(e) => Err(e),
        }
    }
}

/// Decide the single outcome of a search once both sides have finished.
///
/// Precedence, highest first:
/// 1. scanner fault
/// 2. resolver or locator error
/// 3. listing failure, unless it only reports that the scanner hung up
/// 4. no match
/// 5. match
pub fn reconcile(
    report: ScanReport,
    listing: Result<(), SourceFailure>,
    diagnostics: &[u8],
) -> SearchOutcome {
    if let Some(fault) = report.fault {
        return SearchOutcome::Failed(SearchError::InternalScan(fault));
    }

    if let Some((revision, source)) = report.resolution_error {
        return SearchOutcome::Failed(SearchError::Resolution { revision, source });
    }

    if let Err(failure) = listing {
        if !failure.is_reader_closed() {
            return SearchOutcome::Failed(SearchError::Source {
                failure,
                diagnostics: String::from_utf8_lossy(diagnostics).into_owned(),
            });
        }
    }

    match report.found {
        None => SearchOutcome::NotFound,
        Some(entry) => SearchOutcome::Found(entry),
    }
}
