//! Cooperative executor: every batch is a task on one thread.
//!
//! Tasks yield after each record, so batches interleave but never run
//! transformer code at the same time. A CPU-bound transformer holds the
//! scheduler until it returns.

use tokio::task::{JoinSet, LocalSet};

use super::Executor;
use crate::config::Strategy;
use crate::pipeline::batch::Batch;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::error::PipelineError;
use crate::transform::Chain;
use crate::Record;

#[derive(Debug, Clone, Copy, Default)]
pub struct Cooperative;

impl Executor for Cooperative {
    fn strategy(&self) -> Strategy {
        Strategy::Async
    }

    /// Blocks on a private current-thread runtime. Inside an existing
    /// runtime this fails with [`PipelineError::NestedRuntime`].
    fn run(&self, batches: Vec<Batch>, chain: &Chain, cancel: &CancelToken) -> Result<Vec<Vec<Record>>, PipelineError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(PipelineError::NestedRuntime);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(PipelineError::Runtime)?;
        runtime.block_on(run_batches(batches, chain, cancel))
    }
}

/// Schedule every batch as a local task and gather results in batch order.
pub(crate) async fn run_batches(
    batches: Vec<Batch>,
    chain: &Chain,
    cancel: &CancelToken,
) -> Result<Vec<Vec<Record>>, PipelineError> {
    let count = batches.len();
    let local = LocalSet::new();
    local
        .run_until(async move {
            let mut tasks = JoinSet::new();
            for batch in batches {
                let chain = chain.clone();
                let cancel = cancel.clone();
                tasks.spawn_local(async move {
                    let index = batch.index;
                    (index, run_batch_yielding(&chain, batch, &cancel).await)
                });
            }

            let mut slots: Vec<Option<Vec<Record>>> = (0..count).map(|_| None).collect();
            while let Some(joined) = tasks.join_next().await {
                let (index, result) = match joined {
                    Ok(pair) => pair,
                    Err(e) => {
                        tasks.abort_all();
                        return Err(if e.is_panic() {
                            PipelineError::WorkerPanicked
                        } else {
                            PipelineError::Cancelled
                        });
                    }
                };
                match result {
                    Ok(records) => {
                        if let Some(slot) = slots.get_mut(index) {
                            *slot = Some(records);
                        }
                    }
                    Err(e) => {
                        tasks.abort_all();
                        return Err(e);
                    }
                }
            }
            slots
                .into_iter()
                .enumerate()
                .map(|(index, slot)| {
                    slot.ok_or_else(|| PipelineError::Worker(format!("batch {index} produced no result")))
                })
                .collect()
        })
        .await
}

async fn run_batch_yielding(chain: &Chain, batch: Batch, cancel: &CancelToken) -> Result<Vec<Record>, PipelineError> {
    let mut out = Vec::with_capacity(batch.records.len());
    for (i, record) in batch.records.into_iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let transformed = chain
            .apply(record)
            .map_err(|e| PipelineError::transform(batch.offset + i, e))?;
        out.push(transformed);
        tokio::task::yield_now().await;
    }
    Ok(out)
}
