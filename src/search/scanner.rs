//! Revision stream scanner
//!
//! Consumes the read end of the revision pipe one line at a time. Each line is
//! resolved to a snapshot, the target path is looked up in it, and the entry's
//! hash is compared against the target. The scan stops at the first match, the
//! first collaborator error, a stream fault, or end-of-stream. Dropping the
//! reader on return is what tells the producer to stop.

use crate::error::{InternalScanError, ObjectError};
use crate::history::{EntryLocator, SnapshotResolver};
use crate::search::pipe::PipeReader;
use crate::types::{ContentHash, Entry, EntryPath, RevisionId};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info, trace};

/// Longest revision line accepted, newline excluded.
pub const MAX_LINE_BYTES: usize = 1024;

const LINE_PREVIEW_BYTES: usize = 64;

/// What one scan observed.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Entry whose hash matched the target
    pub found: Option<Entry>,
    /// First resolver or locator failure, with the revision being processed
    pub resolution_error: Option<(RevisionId, ObjectError)>,
    /// Fault of the stream machinery itself
    pub fault: Option<InternalScanError>,
    /// Revisions taken off the stream and looked up
    pub revisions_scanned: usize,
}

impl ScanReport {
    pub fn faulted(fault: InternalScanError) -> Self {
        Self {
            fault: Some(fault),
            ..Self::default()
        }
    }
}

pub struct Scanner {
    resolver: Arc<dyn SnapshotResolver>,
    locator: Arc<dyn EntryLocator>,
    target: ContentHash,
    path: EntryPath,
}

impl Scanner {
    pub fn new(
        resolver: Arc<dyn SnapshotResolver>,
        locator: Arc<dyn EntryLocator>,
        target: ContentHash,
        path: EntryPath,
    ) -> Self {
        Self {
            resolver,
            locator,
            target,
            path,
        }
    }

    /// Scan until match, error, or end-of-stream. Consumes the read end.
    pub async fn run(self, reader: PipeReader) -> ScanReport {
        let mut report = ScanReport::default();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        debug!(path = %self.path, "scanning revisions");

        loop {
            let line = match read_line(&mut reader, &mut buf).await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    trace!("revision stream ended");
                    break;
                }
                Err(fault) => {
                    report.fault = Some(fault);
                    break;
                }
            };

            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            let revision = match RevisionId::parse(token) {
                Ok(revision) => revision,
                Err(_) => {
                    report.fault = Some(InternalScanError::MalformedLine(token.to_string()));
                    break;
                }
            };
            report.revisions_scanned += 1;

            trace!(revision = %revision, "resolving snapshot");
            let snapshot = match self.resolver.resolve_snapshot(&revision).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    debug!(revision = %revision, error = %e, "failed to resolve snapshot");
                    report.resolution_error = Some((revision, e));
                    break;
                }
            };

            let entry = match self.locator.locate_entry(&snapshot, &self.path).await {
                Ok(entry) => entry,
                Err(ObjectError::PathNotFound(_)) => {
                    trace!(revision = %revision, path = %self.path, "path absent at revision");
                    continue;
                }
                Err(e) => {
                    debug!(
                        revision = %revision,
                        path = %self.path,
                        error = %e,
                        "failed to locate entry"
                    );
                    report.resolution_error = Some((revision, e));
                    break;
                }
            };

            trace!(revision = %revision, hash = %entry.hash, "entry at revision");
            if entry.hash == self.target {
                info!(revision = %revision, hash = %entry.hash, "found matching entry");
                report.found = Some(entry);
                break;
            }
        }

        // Closes the read end.
        drop(reader);
        report
    }
}

/// Read one line of at most `MAX_LINE_BYTES` (newline excluded) into `buf`.
///
/// `Ok(None)` is end-of-stream. A longer run without a newline is a
/// `MalformedLine` carrying its first bytes.
async fn read_line<'a>(
    reader: &mut BufReader<PipeReader>,
    buf: &'a mut Vec<u8>,
) -> Result<Option<&'a str>, InternalScanError> {
    buf.clear();
    let read = reader
        .take(MAX_LINE_BYTES as u64 + 1)
        .read_until(b'\n', buf)
        .await
        .map_err(InternalScanError::Read)?;
    if read == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    } else if buf.len() > MAX_LINE_BYTES {
        let preview = String::from_utf8_lossy(&buf[..LINE_PREVIEW_BYTES]);
        return Err(InternalScanError::MalformedLine(format!(
            "{}... (no newline within {} bytes)",
            preview, MAX_LINE_BYTES
        )));
    }
    std::str::from_utf8(buf)
        .map(Some)
        .map_err(|e| InternalScanError::Read(io::Error::new(io::ErrorKind::InvalidData, e)))
}
