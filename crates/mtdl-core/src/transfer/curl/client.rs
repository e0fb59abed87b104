//! Per-worker connection: one easy handle reused for every file in the batch.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use ::curl::easy::Easy;
use url::Url;

use crate::transfer::{batch_percent, BatchError, TransferClient, TransferConnector, TransferError};
use crate::url_model;

use super::{check_status, CurlSettings};

/// Opens [`CurlTransferClient`]s for configured sources.
#[derive(Debug, Clone)]
pub struct CurlConnector {
    settings: CurlSettings,
}

impl CurlConnector {
    pub fn new(settings: CurlSettings) -> Self {
        Self { settings }
    }
}

impl TransferConnector for CurlConnector {
    type Client = CurlTransferClient;

    /// Logs in / reaches the source root without transferring a body, so a bad
    /// host or rejected credentials fail here rather than mid-batch.
    fn connect(&self, source_name: &str) -> Result<CurlTransferClient, TransferError> {
        let (base, source) = self.settings.endpoint(source_name)?;
        let mut easy = self.settings.open_handle(source)?;
        easy.url(base.as_str())?;
        easy.nobody(true)?;
        easy.perform()?;
        tracing::debug!(source = source_name, url = %base, "connection established");
        Ok(CurlTransferClient {
            source_name: source_name.to_string(),
            base,
            easy: Some(easy),
        })
    }
}

/// A worker's open connection to one source.
pub struct CurlTransferClient {
    source_name: String,
    base: Url,
    easy: Option<Easy>,
}

impl std::fmt::Debug for CurlTransferClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurlTransferClient")
            .field("source_name", &self.source_name)
            .field("base", &self.base.as_str())
            .field("open", &self.easy.is_some())
            .finish()
    }
}

impl CurlTransferClient {
    pub fn is_open(&self) -> bool {
        self.easy.is_some()
    }
}

impl TransferClient for CurlTransferClient {
    fn download_batch(
        &mut self,
        items: &[String],
        dest_dir: &Path,
        chunk_size: usize,
        mut on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<usize, BatchError> {
        let easy = self
            .easy
            .as_mut()
            .ok_or_else(|| BatchError::new(0, TransferError::NotConnected))?;
        if items.is_empty() {
            return Ok(0);
        }
        fs::create_dir_all(dest_dir).map_err(|e| BatchError::new(0, e))?;
        easy.nobody(false).map_err(|e| BatchError::new(0, e))?;
        easy.buffer_size(chunk_size.max(1)).map_err(|e| BatchError::new(0, e))?;

        let mut completed = 0usize;
        for (i, item) in items.iter().enumerate() {
            let target = dest_dir.join(url_model::local_filename(item));
            let result = url_model::remote_url(&self.base, item)
                .map_err(TransferError::from)
                .and_then(|url| fetch_one(easy, &url, &target));
            match result {
                Ok(bytes) => {
                    completed += 1;
                    tracing::debug!(item = %item, bytes, path = %target.display(), "downloaded");
                }
                Err(e) => {
                    if !e.is_file_scoped() {
                        return Err(BatchError::new(completed, e));
                    }
                    tracing::warn!(item = %item, error = %e, "skipping file");
                }
            }
            if let Some(cb) = on_progress.as_mut() {
                cb(batch_percent(i + 1, items.len()));
            }
        }
        Ok(completed)
    }

    fn close(&mut self) {
        if self.easy.take().is_some() {
            tracing::debug!(source = %self.source_name, "connection closed");
        }
    }
}

impl Drop for CurlTransferClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// GET one file into `target`, returning the bytes written. A file this call
/// created is removed again when the transfer fails.
fn fetch_one(easy: &mut Easy, url: &Url, target: &Path) -> Result<u64, TransferError> {
    easy.url(url.as_str())?;
    let file = File::create(target)?;
    let result = write_body(easy, url, file);
    if result.is_err() {
        let _ = fs::remove_file(target);
    }
    result
}

fn write_body(easy: &mut Easy, url: &Url, mut file: File) -> Result<u64, TransferError> {
    let mut written = 0u64;
    let mut write_error: Option<io::Error> = None;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                // Short write makes curl abort with a write error.
                Ok(0)
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if e.is_write_error() {
            if let Some(io_err) = write_error {
                return Err(TransferError::Storage(io_err));
            }
        }
        return Err(TransferError::Curl(e));
    }
    check_status(easy, url)?;
    file.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn closed_client() -> CurlTransferClient {
        CurlTransferClient {
            source_name: "test".to_string(),
            base: url_model::base_url("http://127.0.0.1:1/").unwrap(),
            easy: None,
        }
    }

    #[test]
    fn connect_unknown_source_fails() {
        let connector = CurlConnector::new(CurlSettings::new(BTreeMap::new(), Duration::from_secs(1)));
        let err = connector.connect("missing").unwrap_err();
        assert!(matches!(err, TransferError::UnknownSource(_)));
    }

    #[test]
    fn closed_client_rejects_batch() {
        let mut client = closed_client();
        let dir = tempfile::tempdir().unwrap();
        let err = client
            .download_batch(&["a".to_string()], dir.path(), 1024, None)
            .unwrap_err();
        assert_eq!(err.completed, 0);
        assert!(matches!(err.error, TransferError::NotConnected));
    }

    #[test]
    fn failed_transfer_removes_only_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.jpg");
        let mut easy = Easy::new();
        easy.connect_timeout(Duration::from_secs(1)).unwrap();
        // Port 1 refuses connections.
        let url = Url::parse("http://127.0.0.1:1/a.jpg").unwrap();
        assert!(fetch_one(&mut easy, &url, &target).is_err());
        assert!(!target.exists());
    }

    #[test]
    fn bad_identifier_leaves_existing_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("keep.jpg");
        fs::write(&existing, b"local data").unwrap();
        let mut client = closed_client();
        client.easy = Some(Easy::new());
        // A cannot-be-a-base source URL makes every identifier fail to resolve.
        client.base = Url::parse("mailto:nobody@example.com").unwrap();
        let err = client
            .download_batch(&["keep.jpg".to_string()], dir.path(), 1024, None)
            .unwrap_err();
        assert_eq!(err.completed, 0);
        assert!(matches!(err.error, TransferError::InvalidUrl(_)));
        assert_eq!(fs::read(&existing).unwrap(), b"local data");
    }

    #[test]
    fn close_is_idempotent() {
        let mut client = closed_client();
        client.easy = Some(Easy::new());
        assert!(client.is_open());
        client.close();
        client.close();
        assert!(!client.is_open());
    }
}
