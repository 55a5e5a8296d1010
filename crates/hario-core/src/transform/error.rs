use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by a single transformer on a single record.
///
/// Serializable so a worker process can hand it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformError {
    #[error("field '{path}' not found")]
    MissingField { path: String },
    #[error("field '{path}' is null")]
    NullField { path: String },
    #[error("field '{path}' is not a mapping")]
    NotMapping { path: String },
    #[error("{message}")]
    Failed { message: String },
}

impl TransformError {
    pub fn failed(message: impl Into<String>) -> Self {
        TransformError::Failed {
            message: message.into(),
        }
    }
}

/// A [`TransformError`] tagged with the transformer that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("transformer `{step}` failed: {error}")]
pub struct StepError {
    pub step: String,
    #[source]
    pub error: TransformError,
}

/// A chain holds a step that cannot be described for another process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transformer `{name}` cannot be sent to a worker process")]
pub struct NotSerializable {
    pub name: String,
}
