//! Errors that end a fetch. Per-worker transfer failures are not among them;
//! they are reported in [`FetchOutcome::failures`](super::FetchOutcome).

use thiserror::Error;

use crate::transfer::TransferError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("listing `{directory}` on `{source_name}` failed: {source}")]
    Listing {
        source_name: String,
        directory: String,
        source: TransferError,
    },

    #[error("worker {worker} could not connect to `{source_name}`: {source}")]
    Connect {
        worker: usize,
        source_name: String,
        source: TransferError,
    },

    /// A blocking listing/connect task panicked or was cancelled.
    #[error("{stage} task failed: {message}")]
    Task { stage: &'static str, message: String },
}
