//! What one fetch should download.

use std::path::PathBuf;

use crate::partition::DEFAULT_SHUFFLE_SEED;

/// Where the file list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// List this remote directory through the file source.
    Directory(String),
    /// Use these identifiers verbatim.
    Paths(Vec<String>),
}

/// Parameters of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source_name: String,
    pub save_dir: PathBuf,
    /// Upper bound on files dispatched, applied after the optional shuffle.
    pub max_download_num: usize,
    pub selection: Selection,
    /// Seed for a reproducible shuffle before truncation; `None` keeps listing order.
    pub shuffle_seed: Option<u64>,
}

impl FetchRequest {
    pub const DEFAULT_MAX_DOWNLOADS: usize = 100;

    fn new(source_name: impl Into<String>, selection: Selection, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_name: source_name.into(),
            save_dir: save_dir.into(),
            max_download_num: Self::DEFAULT_MAX_DOWNLOADS,
            selection,
            shuffle_seed: None,
        }
    }

    /// Fetch the files of a remote directory.
    pub fn directory(
        source_name: impl Into<String>,
        directory: impl Into<String>,
        save_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::new(source_name, Selection::Directory(directory.into()), save_dir)
    }

    /// Fetch an explicit list of remote identifiers.
    pub fn paths(source_name: impl Into<String>, paths: Vec<String>, save_dir: impl Into<PathBuf>) -> Self {
        Self::new(source_name, Selection::Paths(paths), save_dir)
    }

    pub fn max_downloads(mut self, max: usize) -> Self {
        self.max_download_num = max;
        self
    }

    /// Shuffle with [`DEFAULT_SHUFFLE_SEED`].
    pub fn shuffled(self) -> Self {
        self.shuffled_with_seed(DEFAULT_SHUFFLE_SEED)
    }

    pub fn shuffled_with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let req = FetchRequest::directory("ftp", "imgs", "/tmp/out");
        assert_eq!(req.max_download_num, 100);
        assert_eq!(req.shuffle_seed, None);
        assert_eq!(req.selection, Selection::Directory("imgs".into()));
        assert_eq!(req.save_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn builder_methods() {
        let req = FetchRequest::paths("ftp", vec!["a".into()], "out")
            .max_downloads(5)
            .shuffled();
        assert_eq!(req.max_download_num, 5);
        assert_eq!(req.shuffle_seed, Some(DEFAULT_SHUFFLE_SEED));
        assert_eq!(req.shuffled_with_seed(9).shuffle_seed, Some(9));
    }
}
