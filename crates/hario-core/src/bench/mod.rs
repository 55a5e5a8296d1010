//! Benchmark mode: run one chain under every strategy and compare throughput.
//!
//! Each strategy processes the same records `repeat` times; the fastest run
//! is reported so a cold first pass (thread spawn, worker start-up) does not
//! dominate. The process strategy is skipped when the chain cannot be sent
//! to a worker.

use anyhow::{Context, Result};
use std::time::Instant;

use crate::config::{PipelineConfig, Strategy, WorkerCommand};
use crate::pipeline::Pipeline;
use crate::transform::Chain;
use crate::Record;

/// Result of one strategy's benchmark.
#[derive(Debug, Clone)]
pub struct BenchResult {
    pub strategy: Strategy,
    pub records: usize,
    pub elapsed_secs: f64,
    pub records_per_sec: f64,
}

/// Runs `chain` over `records` under each strategy, `repeat` times each
/// (at least once). Runs on the current thread; call from `spawn_blocking`
/// if used from async.
pub fn run_bench(
    records: &[Record],
    chain: &Chain,
    batch_size: usize,
    max_workers: Option<usize>,
    repeat: usize,
    worker_command: Option<WorkerCommand>,
) -> Result<Vec<BenchResult>> {
    let repeat = repeat.max(1);
    let mut results = Vec::with_capacity(Strategy::ALL.len());

    for strategy in Strategy::ALL {
        if strategy == Strategy::Process {
            if let Err(e) = chain.to_spec() {
                tracing::warn!(error = %e, "skipping process strategy");
                continue;
            }
        }
        let mut config = PipelineConfig::new(batch_size, strategy, max_workers)
            .with_context(|| format!("configure {strategy} strategy"))?;
        if let Some(command) = &worker_command {
            config = config.with_worker_command(command.clone());
        }
        let pipeline = Pipeline::new(chain.clone(), config);

        let mut best = f64::INFINITY;
        for _ in 0..repeat {
            let input = records.to_vec();
            let start = Instant::now();
            pipeline
                .process(input)
                .with_context(|| format!("{strategy} run failed"))?;
            best = best.min(start.elapsed().as_secs_f64());
        }

        let records_per_sec = if best > 0.0 {
            records.len() as f64 / best
        } else {
            0.0
        };
        tracing::debug!(%strategy, elapsed_secs = best, records_per_sec, "bench run finished");
        results.push(BenchResult {
            strategy,
            records: records.len(),
            elapsed_secs: best,
            records_per_sec,
        });
    }

    Ok(results)
}

/// Picks the strategy with the best throughput.
pub fn recommend_strategy(results: &[BenchResult]) -> Option<Strategy> {
    results
        .iter()
        .max_by(|a, b| {
            a.records_per_sec
                .partial_cmp(&b.records_per_sec)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|r| r.strategy)
}
