//! Order-preserving, fail-fast batch execution of a transformer chain.
//!
//! A run partitions the input into contiguous batches, hands them to the
//! executor selected by the configured [`Strategy`], and concatenates the
//! results in batch order. The first failing record fails the whole call
//! and no partial output is returned.

mod batch;
mod cancel;
mod error;
mod executor;
mod state;
pub mod worker;

pub use batch::{plan_batches, Batch};
pub use cancel::CancelToken;
pub use error::PipelineError;
pub use executor::{executor_for, Cooperative, Executor, ProcessPool, Sequential, ThreadPool};
pub use state::RunState;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use self::state::Run;
use crate::config::{PipelineConfig, Strategy};
use crate::har::HarLog;
use crate::schema::type_name;
use crate::transform::{set_id, Chain, IdFn, Transformer};
use crate::Record;

#[derive(Clone)]
pub struct Pipeline {
    chain: Chain,
    config: PipelineConfig,
    executor: Arc<dyn Executor>,
}

#[derive(Default)]
pub struct PipelineBuilder {
    id: Option<(IdFn, String)>,
    chain: Chain,
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Set the identifier step; it always runs first.
    pub fn id(mut self, id: IdFn, field: impl Into<String>) -> Self {
        self.id = Some((id, field.into()));
        self
    }

    pub fn transformer(mut self, step: impl Transformer + 'static) -> Self {
        self.chain.push(step);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Pipeline {
        let mut chain = Chain::new();
        if let Some((id, field)) = self.id {
            chain.push(set_id(id, field));
        }
        chain.append(self.chain);
        Pipeline::new(chain, self.config)
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn new(chain: Chain, config: PipelineConfig) -> Self {
        let executor = executor_for(&config);
        Self {
            chain,
            config,
            executor,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn process(&self, records: Vec<Record>) -> Result<Vec<Record>, PipelineError> {
        self.process_with_cancel(records, &CancelToken::new())
    }

    /// Like [`Pipeline::process`], for input that has not been typed yet.
    /// Anything other than a sequence of mappings fails before any work starts.
    pub fn process_value(&self, input: Value) -> Result<Vec<Record>, PipelineError> {
        self.process(records_from_value(input)?)
    }

    /// Dump every validated entry of `log` and process the result.
    pub fn process_log(&self, log: &HarLog) -> Result<Vec<Record>, PipelineError> {
        let records = log
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_record().map_err(|source| PipelineError::Dump { index, source }))
            .collect::<Result<Vec<_>, _>>()?;
        self.process(records)
    }

    pub fn process_with_cancel(&self, records: Vec<Record>, cancel: &CancelToken) -> Result<Vec<Record>, PipelineError> {
        let mut run = Run::start(self.config.strategy(), records.len());
        let batches = self.plan(&mut run, records);
        let outcome = self.executor.run(batches, &self.chain, cancel);
        run.complete(outcome)
    }

    /// Async entry point. The async strategy runs its tasks on the caller's
    /// runtime (the returned future is not `Send`); the other strategies run
    /// on the blocking pool.
    pub async fn process_async(&self, records: Vec<Record>) -> Result<Vec<Record>, PipelineError> {
        if self.config.strategy() == Strategy::Async {
            let mut run = Run::start(Strategy::Async, records.len());
            let batches = self.plan(&mut run, records);
            let outcome = executor::run_batches_async(batches, &self.chain, &CancelToken::new()).await;
            return run.complete(outcome);
        }
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.process(records))
            .await
            .map_err(|_| PipelineError::WorkerPanicked)?
    }

    fn plan(&self, run: &mut Run, records: Vec<Record>) -> Vec<Batch> {
        run.advance(RunState::Batching);
        let batches = plan_batches(records, self.config.batch_size());
        run.advance(RunState::Dispatching);
        tracing::debug!(
            batches = batches.len(),
            batch_size = self.config.batch_size(),
            "dispatching batches"
        );
        batches
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("chain", &self.chain)
            .field("config", &self.config)
            .finish()
    }
}

fn records_from_value(input: Value) -> Result<Vec<Record>, PipelineError> {
    let items = match input {
        Value::Array(items) => items,
        other => {
            return Err(PipelineError::InputShape {
                found: type_name(&other).to_string(),
            })
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(PipelineError::InputShape {
                found: format!("{} at index {i}", type_name(&other)),
            }),
        })
        .collect()
}
