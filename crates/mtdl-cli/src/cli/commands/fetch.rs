//! `mtdl fetch` – download files from a source with the worker pool.

use anyhow::{Context, Result};
use mtdl_core::config::MtdlConfig;
use mtdl_core::orchestrator::{Downloader, FetchRequest, WorkerSettings};
use mtdl_core::partition::DEFAULT_SHUFFLE_SEED;
use mtdl_core::progress::ProgressCallback;
use mtdl_core::transfer::curl::{CurlConnector, CurlFileSource, CurlSettings};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Arguments of `mtdl fetch` after CLI parsing.
#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub source: String,
    pub paths: Vec<String>,
    pub dir: Option<String>,
    pub list: Option<PathBuf>,
    pub save_dir: PathBuf,
    pub max: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
}

pub async fn run_fetch(cfg: &MtdlConfig, args: FetchArgs) -> Result<()> {
    let request = build_request(&args)?;

    let mut settings = WorkerSettings::from_config(cfg);
    if let Some(n) = args.workers {
        settings.workers = n;
    }
    let curl = CurlSettings::from_config(cfg);
    let downloader = Downloader::new(
        CurlFileSource::new(curl.clone()),
        CurlConnector::new(curl),
        settings,
    )?;

    let (progress_tx, mut progress_rx) = mpsc::channel::<u8>(64);
    let printer = tokio::spawn(async move {
        let mut last = None;
        while let Some(pct) = progress_rx.recv().await {
            if last != Some(pct) {
                print!("\r  {:>3}%", pct);
                let _ = std::io::stdout().flush();
                last = Some(pct);
            }
        }
        if last.is_some() {
            println!();
        }
    });

    let (on_progress, last) = forward_progress(progress_tx.clone());
    let result = downloader.run(request, Some(on_progress)).await;
    // try_send may have dropped the final value; resend it.
    if let Some(pct) = last.get() {
        let _ = progress_tx.send(pct).await;
    }
    // Last sender gone: the printer drains and exits.
    drop(progress_tx);
    let _ = printer.await;
    let outcome = result?;

    for failure in &outcome.failures {
        eprintln!(
            "worker {} failed ({:?}) after {} file(s): {}",
            failure.worker, failure.stage, failure.completed, failure.message
        );
    }
    println!(
        "Downloaded {} of {} file(s) to {}",
        outcome.success_count,
        outcome.dispatched,
        args.save_dir.display()
    );
    Ok(())
}

/// Last overall percent seen by the progress callback.
#[derive(Debug, Default)]
struct LastPercent {
    value: AtomicU8,
    seen: AtomicBool,
}

impl LastPercent {
    fn get(&self) -> Option<u8> {
        self.seen
            .load(Ordering::SeqCst)
            .then(|| self.value.load(Ordering::SeqCst))
    }
}

/// Progress callback that forwards into `tx` without blocking the workers.
/// A full channel drops the update; the returned handle keeps the last value.
fn forward_progress(tx: mpsc::Sender<u8>) -> (ProgressCallback, Arc<LastPercent>) {
    let last = Arc::new(LastPercent::default());
    let seen = Arc::clone(&last);
    let callback: ProgressCallback = Box::new(move |pct| {
        seen.value.store(pct, Ordering::SeqCst);
        seen.seen.store(true, Ordering::SeqCst);
        let _ = tx.try_send(pct);
    });
    (callback, last)
}

/// Builds the fetch request from `--dir`, `--list` or positional paths.
pub(crate) fn build_request(args: &FetchArgs) -> Result<FetchRequest> {
    let request = if let Some(dir) = &args.dir {
        FetchRequest::directory(&args.source, dir, &args.save_dir)
    } else if let Some(list) = &args.list {
        FetchRequest::paths(&args.source, read_list(list)?, &args.save_dir)
    } else if !args.paths.is_empty() {
        FetchRequest::paths(&args.source, args.paths.clone(), &args.save_dir)
    } else {
        anyhow::bail!("nothing to fetch: pass remote paths, --dir or --list");
    };

    let request = request.max_downloads(args.max);
    Ok(if args.shuffle {
        request.shuffled_with_seed(args.seed.unwrap_or(DEFAULT_SHUFFLE_SEED))
    } else {
        request
    })
}

fn read_list(path: &Path) -> Result<Vec<String>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading file list {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}
