use super::pool::{run_pool, BatchWorker};
use super::Executor;
use crate::config::Strategy;
use crate::pipeline::batch::{run_batch, Batch};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::error::PipelineError;
use crate::transform::Chain;
use crate::Record;

/// Runs batches on a bounded pool of OS threads sharing one chain.
#[derive(Debug, Clone)]
pub struct ThreadPool {
    max_workers: usize,
}

impl ThreadPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }
}

struct ChainWorker {
    chain: Chain,
}

impl BatchWorker for ChainWorker {
    fn run(&mut self, batch: Batch) -> Result<Vec<Record>, PipelineError> {
        run_batch(&self.chain, batch)
    }

    fn shutdown(self: Box<Self>, _aborted: bool) {}
}

impl Executor for ThreadPool {
    fn strategy(&self) -> Strategy {
        Strategy::Thread
    }

    fn run(&self, batches: Vec<Batch>, chain: &Chain, cancel: &CancelToken) -> Result<Vec<Vec<Record>>, PipelineError> {
        let chain = chain.clone();
        run_pool("thread", batches, self.max_workers, cancel, move |_| {
            Ok(Box::new(ChainWorker { chain: chain.clone() }) as Box<dyn BatchWorker>)
        })
    }
}
