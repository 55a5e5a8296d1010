//! Tests for inspect, bench and worker.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::{CommandFactory, Parser};
use std::path::Path;

#[test]
fn cli_parse_inspect() {
    match parse(&["hario", "inspect", "capture.har"]) {
        CliCommand::Inspect { path } => assert_eq!(path, Path::new("capture.har")),
        _ => panic!("expected Inspect"),
    }
}

#[test]
fn cli_parse_bench_default_repeat() {
    match parse(&["hario", "bench", "capture.har"]) {
        CliCommand::Bench { path, repeat, sizing } => {
            assert_eq!(path, Path::new("capture.har"));
            assert_eq!(repeat, 3);
            assert!(sizing.batch_size.is_none());
        }
        _ => panic!("expected Bench"),
    }
}

#[test]
fn cli_parse_bench_options() {
    match parse(&["hario", "bench", "capture.har", "--repeat", "5", "--batch-size", "100", "--workers", "2"]) {
        CliCommand::Bench { repeat, sizing, .. } => {
            assert_eq!(repeat, 5);
            assert_eq!(sizing.batch_size, Some(100));
            assert_eq!(sizing.workers, Some(2));
        }
        _ => panic!("expected Bench"),
    }
}

#[test]
fn cli_parse_worker_is_hidden() {
    assert!(matches!(parse(&["hario", "worker"]), CliCommand::Worker));
    let help = Cli::command().render_help().to_string();
    assert!(!help.contains("worker protocol"), "{help}");
    assert!(help.contains("process"));
}

#[test]
fn cli_parse_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["hario", "download", "x"]).is_err());
}
