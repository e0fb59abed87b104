//! libcurl-backed source listing and transfers.
//!
//! Works with any URL scheme libcurl handles; FTP and HTTP(S) are the ones
//! exercised. Each [`CurlTransferClient`] owns one easy handle for its whole
//! batch so the control connection is reused between files.

mod client;
mod listing;

use std::collections::BTreeMap;
use std::time::Duration;

use ::curl::easy::Easy;
use url::Url;

use crate::config::{MtdlConfig, SourceConfig};
use crate::url_model;

use super::TransferError;

pub use client::{CurlConnector, CurlTransferClient};
pub use listing::CurlFileSource;

/// Abort a transfer when throughput stays under this many bytes/s ...
const LOW_SPEED_LIMIT: u32 = 1024;
/// ... for this long.
const LOW_SPEED_TIME: Duration = Duration::from_secs(60);

/// Source table and connection settings shared by the curl connector and file source.
#[derive(Debug, Clone)]
pub struct CurlSettings {
    sources: BTreeMap<String, SourceConfig>,
    connect_timeout: Duration,
}

impl CurlSettings {
    pub fn new(sources: BTreeMap<String, SourceConfig>, connect_timeout: Duration) -> Self {
        Self {
            sources,
            connect_timeout,
        }
    }

    pub fn from_config(cfg: &MtdlConfig) -> Self {
        Self::new(cfg.sources.clone(), cfg.connect_timeout())
    }

    /// Base URL and config for a named source.
    fn endpoint(&self, source_name: &str) -> Result<(Url, &SourceConfig), TransferError> {
        let source = self
            .sources
            .get(source_name)
            .ok_or_else(|| TransferError::UnknownSource(source_name.to_string()))?;
        Ok((url_model::base_url(&source.url)?, source))
    }

    /// New easy handle with credentials and timeouts applied.
    fn open_handle(&self, source: &SourceConfig) -> Result<Easy, TransferError> {
        let mut easy = Easy::new();
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(LOW_SPEED_LIMIT)?;
        easy.low_speed_time(LOW_SPEED_TIME)?;
        easy.follow_location(true)?;
        if let Some(user) = source.username.as_deref() {
            easy.username(user)?;
        }
        if let Some(pass) = source.password.as_deref() {
            easy.password(pass)?;
        }
        Ok(easy)
    }
}

/// HTTP-style error status (FTP failures surface as curl errors instead).
fn check_status(easy: &mut Easy, url: &Url) -> Result<(), TransferError> {
    let code = easy.response_code()?;
    if code >= 400 {
        return Err(TransferError::Status {
            url: url.to_string(),
            code,
        });
    }
    Ok(())
}
