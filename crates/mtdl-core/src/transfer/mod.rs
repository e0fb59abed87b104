//! Collaborator interfaces used by the orchestrator.
//!
//! - [`RemoteFileSource`]: lists the files of a remote directory, using a
//!   connection held only for the duration of the call.
//! - [`TransferConnector`]: opens one long-lived [`TransferClient`] per worker.
//! - [`TransferClient`]: downloads a batch of files sequentially over its own
//!   connection, reporting batch percent as it goes.
//!
//! [`curl`] provides the libcurl-backed implementations (FTP and HTTP).

pub mod curl;
mod error;

use std::path::Path;

pub use error::{BatchError, TransferError};

/// Lists remote files for a named source.
pub trait RemoteFileSource: Send + Sync + 'static {
    /// Identifiers of the files in `directory`, relative to the source root.
    fn list_files(&self, source_name: &str, directory: &str) -> Result<Vec<String>, TransferError>;
}

/// Opens per-worker connections to a named source.
pub trait TransferConnector: Send + Sync + 'static {
    type Client: TransferClient + 'static;

    /// Establishes a new connection; the returned client owns it until `close`.
    fn connect(&self, source_name: &str) -> Result<Self::Client, TransferError>;
}

/// One worker's connection.
pub trait TransferClient: Send {
    /// Downloads `items` into `dest_dir` in order and returns how many were saved.
    /// `on_progress` receives the batch percent (0..=100) after each item.
    /// An error that ends the batch early carries the count saved so far.
    fn download_batch(
        &mut self,
        items: &[String],
        dest_dir: &Path,
        chunk_size: usize,
        on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<usize, BatchError>;

    /// Releases the connection. Idempotent; never fails.
    fn close(&mut self);
}

/// Batch percent after `done` of `total` items.
pub fn batch_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}
