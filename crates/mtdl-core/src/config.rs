use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do when one worker cannot establish its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectPolicy {
    /// Close every connection opened so far and fail the whole fetch before any transfer starts.
    #[default]
    Abort,
    /// Record the failure for that worker and run the others; its files count as not downloaded.
    Isolate,
}

/// One named remote file source (e.g. an FTP server root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL; remote identifiers are resolved relative to it (`ftp://host/root/`).
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl SourceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Global configuration loaded from `~/.config/mtdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtdlConfig {
    /// Number of workers; each holds its own connection for the whole fetch.
    pub workers: usize,
    /// Transfer buffer size in bytes handed to each worker's batch download.
    pub chunk_size: usize,
    #[serde(default)]
    pub connect_policy: ConnectPolicy,
    /// Connection establishment timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Named sources, selected per fetch by name.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for MtdlConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            chunk_size: 1024,
            connect_policy: ConnectPolicy::Abort,
            connect_timeout_secs: default_connect_timeout_secs(),
            sources: BTreeMap::new(),
        }
    }
}

impl MtdlConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.get(name)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mtdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MtdlConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<MtdlConfig> {
    if !path.exists() {
        let default_cfg = MtdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: MtdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
