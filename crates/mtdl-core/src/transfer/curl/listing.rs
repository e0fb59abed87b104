//! Directory listing over a short-lived connection.

use ::curl::easy::Easy;
use url::Url;

use crate::transfer::{RemoteFileSource, TransferError};
use crate::url_model;

use super::{check_status, CurlSettings};

/// Lists remote directories. FTP uses a name-only listing (NLST); other
/// schemes expect a newline-separated list of names in the response body.
#[derive(Debug, Clone)]
pub struct CurlFileSource {
    settings: CurlSettings,
}

impl CurlFileSource {
    pub fn new(settings: CurlSettings) -> Self {
        Self { settings }
    }
}

impl RemoteFileSource for CurlFileSource {
    fn list_files(&self, source_name: &str, directory: &str) -> Result<Vec<String>, TransferError> {
        let (base, source) = self.settings.endpoint(source_name)?;
        let url = url_model::directory_url(&base, directory)?;

        // Dropped on return: the listing connection never outlives this call.
        let mut easy: Easy = self.settings.open_handle(source)?;
        easy.url(url.as_str())?;
        if is_ftp(&url) {
            // Names only; a plain LIST returns long-format lines.
            easy.custom_request("NLST")?;
        }

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        check_status(&mut easy, &url)?;

        let files = parse_listing(&String::from_utf8_lossy(&body), directory);
        tracing::debug!(source = source_name, dir = directory, count = files.len(), "listed directory");
        Ok(files)
    }
}

fn is_ftp(url: &Url) -> bool {
    matches!(url.scheme(), "ftp" | "ftps")
}

/// Turns listing lines into identifiers under `directory`.
fn parse_listing(body: &str, directory: &str) -> Vec<String> {
    let dir = directory.trim_matches('/');
    body.lines()
        .filter_map(|line| url_model::last_segment(line.trim()))
        .filter(|name| *name != "." && *name != "..")
        .map(|name| {
            if dir.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", dir, name)
            }
        })
        .collect()
}
