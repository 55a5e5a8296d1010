use thiserror::Error;

use crate::transform::{NotSerializable, StepError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("expected a sequence of record mappings, found {found}")]
    InputShape { found: String },

    /// `index` is the record's position in the whole input, not in its batch.
    #[error("record {index}: {source}")]
    Transform {
        index: usize,
        #[source]
        source: StepError,
    },

    #[error(transparent)]
    NotSerializable(#[from] NotSerializable),

    #[error("could not encode entry {index}: {source}")]
    Dump {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("worker process failed: {0}")]
    Worker(String),

    #[error("worker panicked")]
    WorkerPanicked,

    #[error("the async strategy cannot block inside a running tokio runtime; use process_async")]
    NestedRuntime,

    #[error("could not start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("pipeline run cancelled")]
    Cancelled,
}

impl PipelineError {
    pub(crate) fn transform(index: usize, source: StepError) -> Self {
        PipelineError::Transform { index, source }
    }

    /// Global index of the failing record, for transformer failures.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            PipelineError::Transform { index, .. } | PipelineError::Dump { index, .. } => Some(*index),
            _ => None,
        }
    }
}
