//! Batch executors, one per [`Strategy`].
//!
//! Every executor returns the transformed batches in batch-index order and
//! stops at the first failing record.

mod cooperative;
mod pool;
mod process;
mod sequential;
mod thread;

pub use cooperative::Cooperative;
pub use process::ProcessPool;
pub use sequential::Sequential;
pub use thread::ThreadPool;

pub(crate) use cooperative::run_batches as run_batches_async;

use std::sync::Arc;

use super::batch::Batch;
use super::cancel::CancelToken;
use super::error::PipelineError;
use crate::config::{PipelineConfig, Strategy};
use crate::transform::Chain;
use crate::Record;

pub trait Executor: Send + Sync {
    fn strategy(&self) -> Strategy;

    fn run(&self, batches: Vec<Batch>, chain: &Chain, cancel: &CancelToken) -> Result<Vec<Vec<Record>>, PipelineError>;
}

/// Executor for the configured strategy.
pub fn executor_for(config: &PipelineConfig) -> Arc<dyn Executor> {
    let workers = config.max_workers().unwrap_or(1);
    match config.strategy() {
        Strategy::Sequential => Arc::new(Sequential),
        Strategy::Thread => Arc::new(ThreadPool::new(workers)),
        Strategy::Process => Arc::new(ProcessPool::new(workers, config.worker_command().cloned())),
        Strategy::Async => Arc::new(Cooperative),
    }
}
