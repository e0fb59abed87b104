//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_fetch_paths_defaults() {
    match parse(&["mtdl", "fetch", "archive", "imgs/a.jpg", "imgs/b.jpg"]) {
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
            assert_eq!(source, "archive");
            assert_eq!(paths, vec!["imgs/a.jpg", "imgs/b.jpg"]);
            assert!(dir.is_none());
            assert!(list.is_none());
            assert!(save_dir.is_none());
            assert_eq!(max, 100);
            assert!(!shuffle);
            assert!(seed.is_none());
            assert!(workers.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_dir_with_options() {
    match parse(&[
        "mtdl", "fetch", "archive", "--dir", "imgs", "--save-dir", "/tmp/out", "--max", "20",
        "--shuffle", "--seed", "9", "--workers", "8",
    ]) {
        CliCommand::Fetch {
            dir,
            save_dir,
            max,
            shuffle,
            seed,
            workers,
            ..
        } => {
            assert_eq!(dir.as_deref(), Some("imgs"));
            assert_eq!(save_dir.as_deref(), Some(Path::new("/tmp/out")));
            assert_eq!(max, 20);
            assert!(shuffle);
            assert_eq!(seed, Some(9));
            assert_eq!(workers, Some(8));
        }
        _ => panic!("expected Fetch with --dir"),
    }
}

#[test]
fn cli_parse_fetch_list_file() {
    match parse(&["mtdl", "fetch", "archive", "--list", "files.txt"]) {
        CliCommand::Fetch { list, .. } => {
            assert_eq!(list.as_deref(), Some(Path::new("files.txt")))
        }
        _ => panic!("expected Fetch with --list"),
    }
}

#[test]
fn cli_fetch_dir_conflicts_with_paths() {
    assert!(Cli::try_parse_from(["mtdl", "fetch", "archive", "a.jpg", "--dir", "imgs"]).is_err());
    assert!(Cli::try_parse_from(["mtdl", "fetch", "archive", "--dir", "imgs", "--list", "f"]).is_err());
}

#[test]
fn cli_seed_requires_shuffle() {
    assert!(Cli::try_parse_from(["mtdl", "fetch", "archive", "--dir", "imgs", "--seed", "3"]).is_err());
}

#[test]
fn cli_parse_list() {
    match parse(&["mtdl", "list", "archive", "imgs"]) {
        CliCommand::List { source, dir } => {
            assert_eq!(source, "archive");
            assert_eq!(dir, "imgs");
        }
        _ => panic!("expected List"),
    }
    match parse(&["mtdl", "list", "archive"]) {
        CliCommand::List { dir, .. } => assert_eq!(dir, ""),
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_sources() {
    assert!(matches!(parse(&["mtdl", "sources"]), CliCommand::Sources));
}
