//! Search Coordinator
//!
//! Runs one history search: the revision listing writes into a bounded pipe on
//! the calling task while a spawned scanner drains it. The scanner reports
//! exactly once over a oneshot channel, panics included. The write end is
//! closed as soon as the listing returns, so the scanner always reaches
//! end-of-stream if it has not already stopped on its own. Only after both
//! sides are done are their results reconciled.

use crate::config::SearchConfig;
use crate::error::InternalScanError;
use crate::history::{EntryLocator, RevisionQuery, RevisionSource, SnapshotResolver};
use crate::search::outcome::{reconcile, SearchOutcome};
use crate::search::pipe::stream_pipe;
use crate::search::scanner::{ScanReport, Scanner};
use crate::types::{ContentHash, EntryPath};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

/// Coordinates a revision listing with a concurrent scanner.
pub struct SearchCoordinator {
    source: Arc<dyn RevisionSource>,
    resolver: Arc<dyn SnapshotResolver>,
    locator: Arc<dyn EntryLocator>,
    config: SearchConfig,
}

impl SearchCoordinator {
    pub fn new(
        source: Arc<dyn RevisionSource>,
        resolver: Arc<dyn SnapshotResolver>,
        locator: Arc<dyn EntryLocator>,
        config: SearchConfig,
    ) -> Self {
        Self {
            source,
            resolver,
            locator,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find the first listed revision whose snapshot holds `target` at `path`.
    ///
    /// Must be called from within a tokio runtime; the scanner is spawned onto it.
    #[instrument(skip_all, fields(hash = %target, path = %path))]
    pub async fn search(&self, target: ContentHash, path: &EntryPath) -> SearchOutcome {
        let start = Instant::now();
        let query = if self.config.limit_to_path {
            RevisionQuery::touching(path.clone())
        } else {
            RevisionQuery::all()
        };

        let (mut writer, reader) = stream_pipe(self.config.pipe_capacity);
        let (done_tx, done_rx) = oneshot::channel::<ScanReport>();

        let scanner = Scanner::new(
            Arc::clone(&self.resolver),
            Arc::clone(&self.locator),
            target,
            path.clone(),
        );
        let scan_task = tokio::spawn(async move {
            let report = match AssertUnwindSafe(scanner.run(reader)).catch_unwind().await {
                Ok(report) => report,
                Err(panic) => ScanReport::faulted(InternalScanError::Panicked(panic_message(
                    panic.as_ref(),
                ))),
            };
            // The coordinator is gone only if its own future was dropped.
            let _ = done_tx.send(report);
        });

        debug!(query = ?query, "listing all revisions");
        let mut diagnostics = Vec::new();
        let listing = self
            .source
            .list_all_revisions(&query, &mut writer, &mut diagnostics)
            .await;
        writer.close();

        let report = match done_rx.await {
            Ok(report) => report,
            Err(_) => ScanReport::faulted(InternalScanError::CompletionLost),
        };
        if let Err(e) = scan_task.await {
            debug!(error = %e, "scanner task ended abnormally");
        }

        match &listing {
            Ok(()) => debug!("revision listing completed"),
            Err(e) if e.is_reader_closed() => {
                debug!("revision listing stopped after scanner closed the stream")
            }
            Err(e) => warn!(error = %e, "revision listing failed"),
        }

        let revisions_scanned = report.revisions_scanned;
        let outcome = reconcile(report, listing, &diagnostics);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            SearchOutcome::Found(entry) => info!(
                revision = %entry.revision,
                revisions_scanned,
                elapsed_ms,
                "search found entry"
            ),
            SearchOutcome::NotFound => info!(revisions_scanned, elapsed_ms, "search found nothing"),
            SearchOutcome::Failed(e) => {
                warn!(error = %e, revisions_scanned, elapsed_ms, "search failed")
            }
        }
        outcome
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
