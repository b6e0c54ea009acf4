//! History search: revision pipe, scanner, coordinator, and outcome.

pub mod coordinator;
pub mod outcome;
pub mod pipe;
pub mod scanner;

pub use coordinator::SearchCoordinator;
pub use outcome::{reconcile, SearchOutcome};
pub use pipe::{stream_pipe, PipeReader, PipeWriter};
pub use scanner::{ScanReport, Scanner};
