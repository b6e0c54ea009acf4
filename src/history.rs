//! History collaborators
//!
//! The search core talks to a repository only through these traits: a
//! revision listing that streams ids into a byte sink, a snapshot resolver, an
//! entry locator, and an object existence check. `git` drives the `git` binary;
//! `memory` serves a fixed in-memory history.

pub mod git;
pub mod memory;

use crate::error::{ObjectError, SourceFailure};
use crate::types::{Entry, EntryPath, RevisionId, Snapshot};
use async_trait::async_trait;
use tokio::io::AsyncWrite;

pub use git::GitRepository;
pub use memory::MemoryHistory;

/// What the revision listing should enumerate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionQuery {
    /// Restrict the listing to revisions touching this path
    pub pathspec: Option<EntryPath>,
}

impl RevisionQuery {
    /// Every revision reachable from any ref, unfiltered.
    pub fn all() -> Self {
        Self { pathspec: None }
    }

    pub fn touching(path: EntryPath) -> Self {
        Self {
            pathspec: Some(path),
        }
    }
}

/// Byte sink the revision listing writes into.
pub type RevisionSink = dyn AsyncWrite + Send + Unpin;

/// Producer of newline-delimited revision ids.
#[async_trait]
pub trait RevisionSource: Send + Sync {
    /// Write one revision id per line into `sink` until the history is
    /// exhausted or the sink's reader goes away.
    ///
    /// Diagnostic output of the underlying listing is appended to
    /// `diagnostics`. A reader that hung up is reported as
    /// [`SourceFailure::ReaderClosed`].
    async fn list_all_revisions(
        &self,
        query: &RevisionQuery,
        sink: &mut RevisionSink,
        diagnostics: &mut Vec<u8>,
    ) -> Result<(), SourceFailure>;
}

/// Resolves a revision to the snapshot stored at it.
#[async_trait]
pub trait SnapshotResolver: Send + Sync {
    async fn resolve_snapshot(&self, revision: &RevisionId) -> Result<Snapshot, ObjectError>;
}

/// Finds the entry at a path inside a snapshot.
#[async_trait]
pub trait EntryLocator: Send + Sync {
    /// Returns [`ObjectError::PathNotFound`] when the snapshot has no such path.
    async fn locate_entry(&self, snapshot: &Snapshot, path: &EntryPath)
        -> Result<Entry, ObjectError>;
}

/// Existence check for a single object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn object_exists(&self, object: &str) -> bool;
}
