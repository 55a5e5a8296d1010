//! Contiguous partitioning of the input into batches.

use super::error::PipelineError;
use crate::transform::Chain;
use crate::Record;

/// A slice of the input. `offset` is the global index of its first record.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub index: usize,
    pub offset: usize,
    pub records: Vec<Record>,
}

/// Split `records` into batches of `batch_size`, in input order.
/// Only the last batch may be shorter; no batch is empty.
pub fn plan_batches(records: Vec<Record>, batch_size: usize) -> Vec<Batch> {
    let batch_size = batch_size.max(1);
    let total = records.len();
    let mut batches = Vec::with_capacity(total.div_ceil(batch_size));
    let mut iter = records.into_iter();
    let mut offset = 0;
    while offset < total {
        let chunk: Vec<Record> = iter.by_ref().take(batch_size).collect();
        let len = chunk.len();
        batches.push(Batch {
            index: batches.len(),
            offset,
            records: chunk,
        });
        offset += len;
    }
    batches
}

/// Apply the chain to every record of a batch, stopping at the first failure.
pub(crate) fn run_batch(chain: &Chain, batch: Batch) -> Result<Vec<Record>, PipelineError> {
    let offset = batch.offset;
    batch
        .records
        .into_iter()
        .enumerate()
        .map(|(i, record)| chain.apply(record).map_err(|e| PipelineError::transform(offset + i, e)))
        .collect()
}
