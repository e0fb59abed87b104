//! Transfer error type and failure classification.

use thiserror::Error;

/// `CURLE_REMOTE_ACCESS_DENIED`: login or path refused by the server.
const CURLE_REMOTE_ACCESS_DENIED: u32 = 9;
/// `CURLE_REMOTE_FILE_NOT_FOUND`: e.g. FTP 550 on `RETR`.
const CURLE_REMOTE_FILE_NOT_FOUND: u32 = 78;

/// Failure of a connection, a listing or a single file transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// No source with this name is configured.
    #[error("unknown source `{0}`")]
    UnknownSource(String),
    /// The source URL or a remote identifier could not be turned into a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// libcurl reported an error (connect, login, timeout, missing remote file, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server answered with an error status.
    #[error("{url} returned status {code}")]
    Status { url: String, code: u32 },
    /// Writing the local file failed (disk full, permission denied, ...).
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    /// The client was used after `close`.
    #[error("connection already closed")]
    NotConnected,
    /// Remote-side failure reported by a non-curl client.
    #[error("{0}")]
    Remote(String),
}

impl TransferError {
    /// True when the failure concerns one remote file only (missing, forbidden)
    /// and the connection can keep serving the rest of the batch.
    pub fn is_file_scoped(&self) -> bool {
        match self {
            TransferError::Curl(e) => matches!(
                e.code(),
                CURLE_REMOTE_FILE_NOT_FOUND | CURLE_REMOTE_ACCESS_DENIED
            ),
            TransferError::Status { code, .. } => (400..500).contains(code),
            _ => false,
        }
    }
}

/// A batch stopped early; `completed` files were saved before `error` hit.
#[derive(Debug, Error)]
#[error("batch aborted after {completed} file(s): {error}")]
pub struct BatchError {
    pub completed: usize,
    #[source]
    pub error: TransferError,
}

impl BatchError {
    pub fn new(completed: usize, error: impl Into<TransferError>) -> Self {
        Self {
            completed,
            error: error.into(),
        }
    }
}
