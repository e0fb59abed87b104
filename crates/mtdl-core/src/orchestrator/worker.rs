//! One worker: its connection, its batch and what happened to it.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::progress::WorkerProgress;
use crate::transfer::{BatchError, TransferClient};

use super::panic_message;

/// State owned by a single worker task for the duration of a fetch.
#[derive(Debug)]
pub(super) struct WorkerState<T> {
    pub worker: usize,
    pub client: T,
    pub batch: Vec<String>,
    /// Last batch percent this worker reported.
    pub percent: u8,
    pub completed: usize,
    pub error: Option<BatchError>,
    /// Panic message if `download_batch` panicked.
    pub panicked: Option<String>,
}

impl<T: TransferClient> WorkerState<T> {
    pub fn new(worker: usize, client: T, batch: Vec<String>) -> Self {
        Self {
            worker,
            client,
            batch,
            percent: 0,
            completed: 0,
            error: None,
            panicked: None,
        }
    }

    /// Downloads the whole batch on this worker's connection. Progress is forwarded
    /// only when `progress` is set. The state (and its client) comes back even if
    /// the transfer panics; the connection is left open for the caller to close.
    pub fn run(mut self, save_dir: &Path, chunk_size: usize, progress: Option<WorkerProgress>) -> Self {
        let percent = &mut self.percent;
        let client = &mut self.client;
        let batch = &self.batch;
        let result = panic::catch_unwind(AssertUnwindSafe(|| match progress {
            Some(reporter) => {
                let mut forward = |p: u8| {
                    *percent = p;
                    reporter.report(p);
                };
                client.download_batch(batch, save_dir, chunk_size, Some(&mut forward))
            }
            None => client.download_batch(batch, save_dir, chunk_size, None),
        }));
        match result {
            Ok(Ok(n)) => self.completed = n,
            Ok(Err(e)) => {
                self.completed = e.completed;
                self.error = Some(e);
            }
            Err(payload) => self.panicked = Some(panic_message(payload.as_ref())),
        }
        self
    }
}
