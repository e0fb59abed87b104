//! Parallel fetch orchestration.
//!
//! One [`Downloader::run`] call moves through these phases:
//!
//! ```text
//! Listing → Partitioned → Dispatching → Running → Joining → Completed
//! ```
//!
//! - Listing: explicit paths, or a listing from the [`RemoteFileSource`];
//!   then optional seeded shuffle and truncation.
//! - Partitioned: round-robin split into one batch per worker.
//! - Dispatching: every worker gets its own connection before any transfer starts.
//! - Running: one blocking task per worker, batch percent forwarded to the
//!   shared [`ProgressAggregator`]. A panicking transfer is caught inside the
//!   task so its connection still comes back.
//! - Joining: all tasks finish, then every connection is closed once.
//! - Completed: per-worker counts summed; failed workers are logged and
//!   recorded, never propagated.

mod error;
mod request;
mod worker;

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::config::{ConnectPolicy, MtdlConfig};
use crate::partition;
use crate::progress::{ProgressAggregator, ProgressCallback};
use crate::transfer::{RemoteFileSource, TransferClient, TransferConnector, TransferError};
use crate::url_model;

use worker::WorkerState;

pub use error::FetchError;
pub use request::{FetchRequest, Selection};

/// Phase of a fetch (used for logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Listing,
    Partitioned,
    Dispatching,
    Running,
    Joining,
    Completed,
}

/// Worker pool settings, fixed for the lifetime of a [`Downloader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub workers: usize,
    pub chunk_size: usize,
    pub connect_policy: ConnectPolicy,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from_config(&MtdlConfig::default())
    }
}

impl WorkerSettings {
    pub fn from_config(cfg: &MtdlConfig) -> Self {
        Self {
            workers: cfg.workers,
            chunk_size: cfg.chunk_size,
            connect_policy: cfg.connect_policy,
        }
    }
}

/// Where a worker gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Connection setup failed (only recorded under [`ConnectPolicy::Isolate`]).
    Connect,
    /// The batch stopped on a transfer error.
    Transfer,
    /// The worker task panicked.
    Panicked,
}

/// A worker that did not finish its batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub worker: usize,
    pub stage: FailureStage,
    /// Files saved before the failure (counted in the total).
    pub completed: usize,
    pub message: String,
}

/// Result of one fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Files saved across all workers.
    pub success_count: usize,
    /// Files handed to workers after shuffle/truncation.
    pub dispatched: usize,
    pub failures: Vec<WorkerFailure>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.success_count == self.dispatched
    }
}

/// Partitions a file list over a fixed pool of workers, each with its own connection.
#[derive(Debug)]
pub struct Downloader<S, C> {
    source: Arc<S>,
    connector: Arc<C>,
    settings: WorkerSettings,
}

impl<S, C> Downloader<S, C>
where
    S: RemoteFileSource,
    C: TransferConnector,
{
    pub fn new(source: S, connector: C, settings: WorkerSettings) -> Result<Self, FetchError> {
        if settings.workers == 0 {
            return Err(FetchError::InvalidWorkerCount);
        }
        Ok(Self {
            source: Arc::new(source),
            connector: Arc::new(connector),
            settings,
        })
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    /// Runs one fetch and returns how many files were saved.
    ///
    /// Fails only when listing fails or (under [`ConnectPolicy::Abort`]) when a
    /// worker cannot connect; transfer failures are absorbed into the outcome.
    /// `on_progress` receives the overall percent across workers.
    pub async fn run(
        &self,
        request: FetchRequest,
        on_progress: Option<ProgressCallback>,
    ) -> Result<FetchOutcome, FetchError> {
        let workers = self.settings.workers;
        let source_name = request.source_name.clone();

        tracing::debug!(phase = ?Phase::Listing, source = %source_name, "fetch started");
        let files = self.resolve_files(&request).await?;
        let files = partition::select(files, request.shuffle_seed, request.max_download_num);
        if files.is_empty() {
            tracing::warn!(source = %source_name, "no files to download");
            return Ok(FetchOutcome::default());
        }

        for (name, count) in url_model::colliding_names(&files) {
            tracing::warn!(file = %name, count, "several remote files share one local name; they overwrite each other");
        }

        let plan = partition::split(&files, workers);
        tracing::debug!(
            phase = ?Phase::Partitioned,
            files = plan.item_count(),
            workers,
            "partitioned file list"
        );

        tracing::debug!(phase = ?Phase::Dispatching, "connecting workers");
        let connections = self.connect_all(&source_name).await?;

        let aggregator = Arc::new(ProgressAggregator::new(workers, on_progress));
        let forward_progress = aggregator.has_callback();
        let save_dir = Arc::new(request.save_dir.clone());
        let chunk_size = self.settings.chunk_size;

        let mut outcome = FetchOutcome {
            dispatched: plan.item_count(),
            ..FetchOutcome::default()
        };
        let mut join_set = JoinSet::new();
        let mut pending = BTreeSet::new();

        tracing::debug!(phase = ?Phase::Running, "dispatching batches");
        for (worker, (batch, connection)) in plan.into_batches().into_iter().zip(connections).enumerate() {
            let client = match connection {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!(worker, error = %e, "worker skipped: connection failed");
                    outcome.failures.push(WorkerFailure {
                        worker,
                        stage: FailureStage::Connect,
                        completed: 0,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let state = WorkerState::new(worker, client, batch);
            let reporter = forward_progress.then(|| aggregator.reporter(worker));
            let save_dir = Arc::clone(&save_dir);
            join_set.spawn_blocking(move || state.run(&save_dir, chunk_size, reporter));
            pending.insert(worker);
        }

        tracing::debug!(phase = ?Phase::Joining, tasks = join_set.len(), "waiting for workers");
        let mut finished: Vec<WorkerState<C::Client>> = Vec::with_capacity(workers);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(state) => {
                    pending.remove(&state.worker);
                    finished.push(state);
                }
                Err(e) => tracing::error!(error = %e, "worker task failed to join"),
            }
        }
        for worker in pending {
            outcome.failures.push(WorkerFailure {
                worker,
                stage: FailureStage::Panicked,
                completed: 0,
                message: "worker task did not complete".to_string(),
            });
        }

        // Every task has terminated; release connections.
        for state in &mut finished {
            state.client.close();
        }

        for state in finished {
            if let Some(message) = state.panicked {
                tracing::error!(worker = state.worker, panic = %message, "worker panicked");
                outcome.failures.push(WorkerFailure {
                    worker: state.worker,
                    stage: FailureStage::Panicked,
                    completed: 0,
                    message,
                });
                continue;
            }
            outcome.success_count += state.completed;
            if let Some(err) = state.error {
                tracing::error!(
                    worker = state.worker,
                    completed = state.completed,
                    assigned = state.batch.len(),
                    last_percent = state.percent,
                    error = %err.error,
                    "worker download failed"
                );
                outcome.failures.push(WorkerFailure {
                    worker: state.worker,
                    stage: FailureStage::Transfer,
                    completed: state.completed,
                    message: err.to_string(),
                });
            }
        }
        outcome.failures.sort_by_key(|f| f.worker);

        tracing::info!(
            phase = ?Phase::Completed,
            source = %source_name,
            downloaded = outcome.success_count,
            dispatched = outcome.dispatched,
            failed_workers = outcome.failures.len(),
            "fetch finished"
        );
        Ok(outcome)
    }

    /// Explicit paths verbatim, or a listing over a connection scoped to the call.
    async fn resolve_files(&self, request: &FetchRequest) -> Result<Vec<String>, FetchError> {
        let directory = match &request.selection {
            Selection::Paths(paths) => return Ok(paths.clone()),
            Selection::Directory(dir) => dir.clone(),
        };
        let source = Arc::clone(&self.source);
        let source_name = request.source_name.clone();
        let (name, dir) = (source_name.clone(), directory.clone());
        let listed = tokio::task::spawn_blocking(move || source.list_files(&name, &dir))
            .await
            .map_err(|e| FetchError::Task {
                stage: "listing",
                message: e.to_string(),
            })?;
        listed.map_err(|source| FetchError::Listing {
            source_name,
            directory,
            source,
        })
    }

    /// Opens one connection per worker, in worker order.
    ///
    /// Under [`ConnectPolicy::Abort`] the first failure closes whatever was opened and
    /// fails the fetch; under [`ConnectPolicy::Isolate`] failures are returned per worker.
    async fn connect_all(
        &self,
        source_name: &str,
    ) -> Result<Vec<Result<C::Client, TransferError>>, FetchError> {
        let connector = Arc::clone(&self.connector);
        let name = source_name.to_string();
        let workers = self.settings.workers;
        let policy = self.settings.connect_policy;

        tokio::task::spawn_blocking(move || {
            let mut connections: Vec<Result<C::Client, TransferError>> = Vec::with_capacity(workers);
            for worker in 0..workers {
                match connector.connect(&name) {
                    Ok(client) => connections.push(Ok(client)),
                    Err(e) if policy == ConnectPolicy::Isolate => connections.push(Err(e)),
                    Err(e) => {
                        for client in connections.iter_mut().flatten() {
                            client.close();
                        }
                        tracing::error!(worker, source = %name, error = %e, "connection failed, aborting fetch");
                        return Err(FetchError::Connect {
                            worker,
                            source_name: name,
                            source: e,
                        });
                    }
                }
            }
            Ok(connections)
        })
        .await
        .map_err(|e| FetchError::Task {
            stage: "connect",
            message: e.to_string(),
        })?
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
