use super::Executor;
use crate::config::Strategy;
use crate::pipeline::batch::{run_batch, Batch};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::error::PipelineError;
use crate::transform::Chain;
use crate::Record;

/// Runs batches one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Executor for Sequential {
    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }

    fn run(&self, batches: Vec<Batch>, chain: &Chain, cancel: &CancelToken) -> Result<Vec<Vec<Record>>, PipelineError> {
        let mut out = Vec::with_capacity(batches.len());
        for batch in batches {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            tracing::trace!(batch = batch.index, records = batch.records.len(), "running batch");
            out.push(run_batch(chain, batch)?);
        }
        Ok(out)
    }
}
