//! `hario bench <path>`: compare strategies on a HAR file.

use anyhow::{anyhow, Context, Result};
use hario_core::bench::{self, BenchResult};
use hario_core::transform::{flatten, normalize_sizes, normalize_timings, set_id};
use hario_core::{Chain, HarioConfig, IdFn};
use std::path::Path;

use super::{load_har, pipeline_settings};
use crate::cli::PipelineArgs;

fn print_bench_results(results: &[BenchResult]) {
    println!(
        "  {:>10}  {:>8}  {:>8}  {:>12}",
        "Strategy", "Records", "Time(s)", "Records/s"
    );
    println!("  {}  {}  {}  {}", "----------", "--------", "--------", "------------");
    for r in results {
        println!(
            "  {:>10}  {:>8}  {:>8.3}  {:>12.1}",
            r.strategy.as_str(),
            r.records,
            r.elapsed_secs,
            r.records_per_sec
        );
    }
}

/// Deterministic id, normalization and flattening: the usual export chain.
fn bench_chain() -> Chain {
    Chain::new()
        .then(set_id(IdFn::by_field(["request.url", "startedDateTime"]), "id"))
        .then(normalize_sizes())
        .then(normalize_timings())
        .then(flatten())
}

/// Runs on its own OS thread: the async strategy starts a private runtime,
/// which cannot happen on a thread that belongs to the CLI's runtime.
pub fn run_bench(cfg: &HarioConfig, path: &Path, repeat: usize, sizing: PipelineArgs) -> Result<()> {
    let log = load_har(cfg, path)?;
    let records = log.entry_records().context("dump validated entries")?;
    let settings = pipeline_settings(cfg, &sizing);
    let results = std::thread::spawn(move || {
        bench::run_bench(
            &records,
            &bench_chain(),
            settings.batch_size,
            settings.max_workers,
            repeat,
            None,
        )
    })
    .join()
    .map_err(|_| anyhow!("bench thread panicked"))??;
    print_bench_results(&results);
    if let Some(rec) = bench::recommend_strategy(&results) {
        println!("Recommended strategy: {}", rec);
    }
    Ok(())
}
