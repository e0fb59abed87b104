//! Joining remote identifiers onto a source base URL.

use url::Url;

/// Parses a source base URL, forcing a trailing `/` so identifiers resolve beneath it.
pub fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// URL of a remote file beneath `base`.
///
/// Each `/`-separated part of the identifier becomes one percent-encoded path
/// segment, so `#`, `?` and `%` are part of the filename and an identifier
/// that looks like an absolute URL still resolves under the source.
/// `.` and `..` parts are dropped.
pub fn remote_url(base: &Url, item: &str) -> Result<Url, url::ParseError> {
    beneath(base, item, false)
}

/// URL of a remote directory (always with a trailing `/`, which FTP listings require).
pub fn directory_url(base: &Url, dir: &str) -> Result<Url, url::ParseError> {
    beneath(base, dir, true)
}

fn beneath(base: &Url, rel: &str, trailing_slash: bool) -> Result<Url, url::ParseError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        segments.pop_if_empty();
        segments.extend(
            rel.split('/')
                .filter(|s| !s.is_empty() && *s != "." && *s != ".."),
        );
        if trailing_slash {
            segments.push("");
        }
    }
    Ok(url)
}

/// Last non-empty `/`-separated segment of an identifier.
pub fn last_segment(item: &str) -> Option<&str> {
    item.split('/').filter(|s| !s.is_empty()).last()
}
