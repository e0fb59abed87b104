//! CLI for MTDL.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mtdl_core::config;
use std::path::PathBuf;

use commands::{run_fetch, run_list, run_sources, FetchArgs};

/// Top-level CLI for MTDL.
#[derive(Debug, Parser)]
#[command(name = "mtdl")]
#[command(about = "MTDL: fetch remote files over several parallel connections", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download files from a configured source, one connection per worker.
    Fetch {
        /// Source name from config.toml.
        source: String,

        /// Remote files to fetch, relative to the source root.
        paths: Vec<String>,

        /// Fetch the files listed in this remote directory instead.
        #[arg(long, value_name = "DIR", conflicts_with_all = ["paths", "list"])]
        dir: Option<String>,

        /// Read remote files from FILE, one per line.
        #[arg(long, value_name = "FILE", conflicts_with = "paths")]
        list: Option<PathBuf>,

        /// Where to save files (default: current directory).
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,

        /// Fetch at most N files.
        #[arg(long, default_value = "100", value_name = "N")]
        max: usize,

        /// Shuffle the file list reproducibly before applying --max.
        #[arg(long)]
        shuffle: bool,

        /// Seed for --shuffle.
        #[arg(long, value_name = "SEED", requires = "shuffle")]
        seed: Option<u64>,

        /// Override the configured number of workers.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },

    /// List the files of a remote directory.
    List {
        /// Source name from config.toml.
        source: String,

        /// Remote directory (default: source root).
        #[arg(default_value = "")]
        dir: String,
    },

    /// Show configured sources.
    Sources,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                source,
                paths,
                dir,
                list,
                save_dir,
                max,
                shuffle,
                seed,
                workers,
            } => {
                let save_dir = match save_dir {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                let args = FetchArgs {
                    source,
                    paths,
                    dir,
                    list,
                    save_dir,
                    max,
                    shuffle,
                    seed,
                    workers,
                };
                run_fetch(&cfg, args).await?;
            }
            CliCommand::List { source, dir } => run_list(&cfg, &source, &dir).await?,
            CliCommand::Sources => run_sources(&cfg),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
