//! In-memory history
//!
//! A fixed table of revisions, each with its snapshot entries, listed in
//! insertion order. Failures can be injected per revision or for the listing
//! as a whole, and every resolve/locate call is recorded.

use crate::error::{ObjectError, SourceFailure};
use crate::history::{
    EntryLocator, ObjectStore, RevisionQuery, RevisionSink, RevisionSource, SnapshotResolver,
};
use crate::search::pipe::classify_write_error;
use crate::types::{ContentHash, Entry, EntryPath, ObjectType, RevisionId, Snapshot};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
struct StoredRevision {
    tree: ContentHash,
    entries: HashMap<EntryPath, Entry>,
}

#[derive(Debug, Clone)]
struct ListingFailure {
    status: String,
    diagnostics: String,
}

/// History served from memory.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    listing: Vec<String>,
    raw_listing: Option<Vec<u8>>,
    revisions: HashMap<String, StoredRevision>,
    resolve_failures: HashMap<String, String>,
    locate_failures: HashMap<String, String>,
    resolve_panics: Vec<String>,
    listing_failure: Option<ListingFailure>,
    resolve_calls: Mutex<Vec<RevisionId>>,
    locate_calls: Mutex<Vec<RevisionId>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a revision whose snapshot holds `entries` (path, blob hash).
    pub fn with_revision(mut self, revision: &str, entries: &[(&str, ContentHash)]) -> Self {
        let revision_id = RevisionId::from_raw(revision);
        let mut stored = HashMap::new();
        for (path, hash) in entries {
            if let Ok(path) = EntryPath::parse(path) {
                stored.insert(
                    path.clone(),
                    Entry {
                        revision: revision_id.clone(),
                        path,
                        mode: "100644".to_string(),
                        kind: ObjectType::Blob,
                        hash: *hash,
                    },
                );
            }
        }
        let tree = synthetic_tree_hash(self.revisions.len());
        self.revisions.insert(
            revision.to_string(),
            StoredRevision {
                tree,
                entries: stored,
            },
        );
        self.listing.push(revision.to_string());
        self
    }

    /// Append `count` revisions `{prefix}0 .. {prefix}{count-1}` that all hold
    /// `path` with `hash`.
    pub fn with_revisions(
        mut self,
        prefix: &str,
        count: usize,
        path: &str,
        hash: ContentHash,
    ) -> Self {
        for index in 0..count {
            self = self.with_revision(&format!("{}{}", prefix, index), &[(path, hash)]);
        }
        self
    }

    /// Make resolving `revision` fail with `message`.
    pub fn with_resolve_failure(mut self, revision: &str, message: &str) -> Self {
        self.resolve_failures
            .insert(revision.to_string(), message.to_string());
        self
    }

    /// Make looking up any path in `revision`'s snapshot fail with `message`.
    pub fn with_locate_failure(mut self, revision: &str, message: &str) -> Self {
        self.locate_failures
            .insert(revision.to_string(), message.to_string());
        self
    }

    /// Make resolving `revision` panic.
    pub fn with_resolve_panic(mut self, revision: &str) -> Self {
        self.resolve_panics.push(revision.to_string());
        self
    }

    /// Finish the listing with a failure status after writing all revisions.
    pub fn with_listing_failure(mut self, status: &str, diagnostics: &str) -> Self {
        self.listing_failure = Some(ListingFailure {
            status: status.to_string(),
            diagnostics: diagnostics.to_string(),
        });
        self
    }

    /// Emit these bytes verbatim instead of one line per revision.
    pub fn with_raw_listing(mut self, bytes: &[u8]) -> Self {
        self.raw_listing = Some(bytes.to_vec());
        self
    }

    /// Revisions passed to `resolve_snapshot`, in call order.
    pub fn resolve_calls(&self) -> Vec<RevisionId> {
        self.resolve_calls.lock().clone()
    }

    /// Revisions whose snapshots were passed to `locate_entry`, in call order.
    pub fn locate_calls(&self) -> Vec<RevisionId> {
        self.locate_calls.lock().clone()
    }

    pub fn reset_calls(&self) {
        self.resolve_calls.lock().clear();
        self.locate_calls.lock().clear();
    }

    fn listing_bytes(&self, query: &RevisionQuery) -> Vec<u8> {
        if let Some(raw) = &self.raw_listing {
            return raw.clone();
        }
        let mut bytes = Vec::new();
        for revision in &self.listing {
            if let Some(path) = &query.pathspec {
                let touches = self
                    .revisions
                    .get(revision)
                    .map(|stored| stored.entries.contains_key(path))
                    .unwrap_or(true);
                if !touches {
                    continue;
                }
            }
            bytes.extend_from_slice(revision.as_bytes());
            bytes.push(b'\n');
        }
        bytes
    }
}

/// Stable stand-in for a tree id, distinct per revision slot.
fn synthetic_tree_hash(slot: usize) -> ContentHash {
    let mut bytes = [0u8; 20];
    bytes[0] = 0x7e;
    bytes[12..].copy_from_slice(&(slot as u64).to_be_bytes());
    ContentHash::Sha1(bytes)
}

#[async_trait]
impl RevisionSource for MemoryHistory {
    async fn list_all_revisions(
        &self,
        query: &RevisionQuery,
        sink: &mut RevisionSink,
        diagnostics: &mut Vec<u8>,
    ) -> Result<(), SourceFailure> {
        let bytes = self.listing_bytes(query);
        for line in bytes.split_inclusive(|b| *b == b'\n') {
            sink.write_all(line).await.map_err(classify_write_error)?;
        }
        sink.flush().await.map_err(classify_write_error)?;

        if let Some(failure) = &self.listing_failure {
            diagnostics.extend_from_slice(failure.diagnostics.as_bytes());
            return Err(SourceFailure::Exited {
                status: failure.status.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotResolver for MemoryHistory {
    async fn resolve_snapshot(&self, revision: &RevisionId) -> Result<Snapshot, ObjectError> {
        self.resolve_calls.lock().push(revision.clone());

        if self.resolve_panics.iter().any(|r| r == revision.as_str()) {
            panic!("injected resolver panic at {}", revision);
        }
        if let Some(message) = self.resolve_failures.get(revision.as_str()) {
            return Err(ObjectError::CommandFailed {
                command: format!("resolve {}", revision),
                status: "injected".to_string(),
                stderr: message.clone(),
            });
        }

        let stored = self
            .revisions
            .get(revision.as_str())
            .ok_or_else(|| ObjectError::RevisionNotFound(revision.clone()))?;
        Ok(Snapshot {
            revision: revision.clone(),
            tree: stored.tree,
        })
    }
}

#[async_trait]
impl EntryLocator for MemoryHistory {
    async fn locate_entry(
        &self,
        snapshot: &Snapshot,
        path: &EntryPath,
    ) -> Result<Entry, ObjectError> {
        self.locate_calls.lock().push(snapshot.revision.clone());

        if let Some(message) = self.locate_failures.get(snapshot.revision.as_str()) {
            return Err(ObjectError::CommandFailed {
                command: format!("locate {} in {}", path, snapshot.revision),
                status: "injected".to_string(),
                stderr: message.clone(),
            });
        }

        self.revisions
            .get(snapshot.revision.as_str())
            .and_then(|stored| stored.entries.get(path))
            .cloned()
            .ok_or_else(|| ObjectError::PathNotFound(path.clone()))
    }
}

#[async_trait]
impl ObjectStore for MemoryHistory {
    async fn object_exists(&self, object: &str) -> bool {
        if self.revisions.contains_key(object) {
            return true;
        }
        let Ok(hash) = ContentHash::from_hex(object) else {
            return false;
        };
        self.revisions.values().any(|stored| {
            stored.tree == hash || stored.entries.values().any(|entry| entry.hash == hash)
        })
    }
}
