use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::{SchemaError, ValidationError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read HAR file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read HAR input: {0}")]
    Read(#[source] io::Error),
    #[error("parse HAR JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid HAR envelope: {0}")]
    Envelope(#[source] ValidationError),
    #[error("entry {index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: SchemaError,
    },
}

impl LoadError {
    /// Index of the offending entry, when one entry was at fault.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            LoadError::Entry { index, .. } => Some(*index),
            _ => None,
        }
    }
}
