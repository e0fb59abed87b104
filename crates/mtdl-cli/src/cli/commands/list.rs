//! `mtdl list <source> [dir]` – print a remote directory listing.

use anyhow::{Context, Result};
use mtdl_core::config::MtdlConfig;
use mtdl_core::transfer::curl::{CurlFileSource, CurlSettings};
use mtdl_core::transfer::RemoteFileSource;

pub async fn run_list(cfg: &MtdlConfig, source: &str, dir: &str) -> Result<()> {
    let files = CurlFileSource::new(CurlSettings::from_config(cfg));
    let (name, directory) = (source.to_string(), dir.to_string());
    let listed = tokio::task::spawn_blocking(move || files.list_files(&name, &directory))
        .await
        .context("listing task")?
        .with_context(|| format!("listing `{}` on `{}`", dir, source))?;

    if listed.is_empty() {
        println!("No files.");
    }
    for item in listed {
        println!("{}", item);
    }
    Ok(())
}
