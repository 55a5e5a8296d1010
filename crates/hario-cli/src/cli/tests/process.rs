//! Tests for `process` argument parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use hario_core::Strategy;
use std::path::Path;

#[test]
fn cli_parse_process_defaults() {
    match parse(&["hario", "process", "capture.har"]) {
        CliCommand::Process {
            path,
            strategy,
            sizing,
            id_field,
            id_by,
            normalize,
            flatten,
            domain,
        } => {
            assert_eq!(path, Path::new("capture.har"));
            assert!(strategy.is_none());
            assert!(sizing.batch_size.is_none());
            assert!(sizing.workers.is_none());
            assert!(id_field.is_none());
            assert!(id_by.is_empty());
            assert!(!normalize && !flatten && !domain);
        }
        _ => panic!("expected Process"),
    }
}

#[test]
fn cli_parse_process_all_flags() {
    let cmd = parse(&[
        "hario",
        "process",
        "capture.har",
        "--strategy",
        "Thread",
        "--batch-size",
        "50",
        "--workers",
        "4",
        "--id-field",
        "entry_id",
        "--id-by",
        "request.url",
        "--id-by",
        "startedDateTime",
        "--normalize",
        "--flatten",
        "--domain",
    ]);
    match cmd {
        CliCommand::Process {
            strategy,
            sizing,
            id_field,
            id_by,
            normalize,
            flatten,
            domain,
            ..
        } => {
            assert_eq!(strategy, Some(Strategy::Thread));
            assert_eq!(sizing.batch_size, Some(50));
            assert_eq!(sizing.workers, Some(4));
            assert_eq!(id_field.as_deref(), Some("entry_id"));
            assert_eq!(id_by, ["request.url", "startedDateTime"]);
            assert!(normalize && flatten && domain);
        }
        _ => panic!("expected Process"),
    }
}

#[test]
fn cli_parse_process_rejects_unknown_strategy() {
    let err = Cli::try_parse_from(["hario", "process", "x.har", "--strategy", "fibers"]).unwrap_err();
    assert!(err.to_string().contains("fibers"), "{err}");
}

#[test]
fn cli_parse_process_requires_path() {
    assert!(Cli::try_parse_from(["hario", "process"]).is_err());
}
