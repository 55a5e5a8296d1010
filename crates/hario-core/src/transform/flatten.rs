//! Collapse nested mappings into a single level of dotted keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::error::TransformError;
use super::{Transformer, TransformerSpec};
use crate::Record;

pub const DEFAULT_SEPARATOR: &str = ".";

/// What an [`ArrayHandler`] makes of a sequence found at some path.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayOutput {
    /// Stored under the sequence's own path.
    Value(Value),
    /// Merged into the flattened record; the sequence's path is not kept.
    Merge(Record),
}

pub trait ArrayHandler: Send + Sync {
    fn handle(&self, items: &[Value], path: &str) -> Result<ArrayOutput, TransformError>;

    fn spec(&self) -> Option<ArraySpec> {
        None
    }
}

impl<F> ArrayHandler for F
where
    F: Fn(&[Value], &str) -> ArrayOutput + Send + Sync,
{
    fn handle(&self, items: &[Value], path: &str) -> Result<ArrayOutput, TransformError> {
        Ok(self(items, path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArraySpec {
    Json,
    Indexed { separator: String },
}

impl ArraySpec {
    pub fn build(&self) -> Arc<dyn ArrayHandler> {
        match self {
            ArraySpec::Json => Arc::new(JsonArrays),
            ArraySpec::Indexed { separator } => Arc::new(IndexedArrays::new(separator.clone())),
        }
    }
}

/// Sequences become their compact JSON text (`"[]"` when empty).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArrays;

impl ArrayHandler for JsonArrays {
    fn handle(&self, items: &[Value], _path: &str) -> Result<ArrayOutput, TransformError> {
        Ok(ArrayOutput::Value(Value::String(compact_json(items)?)))
    }

    fn spec(&self) -> Option<ArraySpec> {
        Some(ArraySpec::Json)
    }
}

/// Each item lands under `path<sep>i`. Scalars are kept as they are,
/// composite items as compact JSON text. An empty sequence becomes `"[]"`.
#[derive(Debug, Clone)]
pub struct IndexedArrays {
    separator: String,
}

impl IndexedArrays {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl ArrayHandler for IndexedArrays {
    fn handle(&self, items: &[Value], path: &str) -> Result<ArrayOutput, TransformError> {
        if items.is_empty() {
            return Ok(ArrayOutput::Value(Value::String("[]".to_string())));
        }
        let mut out = Record::new();
        for (i, item) in items.iter().enumerate() {
            let value = match item {
                Value::Array(_) | Value::Object(_) => Value::String(compact_json(item)?),
                scalar => scalar.clone(),
            };
            out.insert(format!("{path}{}{i}", self.separator), value);
        }
        Ok(ArrayOutput::Merge(out))
    }

    fn spec(&self) -> Option<ArraySpec> {
        Some(ArraySpec::Indexed {
            separator: self.separator.clone(),
        })
    }
}

fn compact_json<T: Serialize + ?Sized>(value: &T) -> Result<String, TransformError> {
    serde_json::to_string(value).map_err(|e| TransformError::failed(format!("could not encode sequence: {e}")))
}

#[derive(Clone)]
pub struct Flatten {
    separator: String,
    arrays: Arc<dyn ArrayHandler>,
}

/// `.`-separated keys, sequences as JSON text.
pub fn flatten() -> Flatten {
    flatten_with(DEFAULT_SEPARATOR, JsonArrays)
}

pub fn flatten_with(separator: impl Into<String>, arrays: impl ArrayHandler + 'static) -> Flatten {
    Flatten {
        separator: separator.into(),
        arrays: Arc::new(arrays),
    }
}

impl Flatten {
    pub(crate) fn from_parts(separator: &str, arrays: Arc<dyn ArrayHandler>) -> Self {
        Self {
            separator: separator.to_string(),
            arrays,
        }
    }

    fn child_path(&self, parent: &str, key: &str) -> String {
        format!("{parent}{}{key}", self.separator)
    }

    /// Walks with an explicit stack so record depth never limits the
    /// call stack. Output keys follow a depth-first, insertion-order walk.
    /// Empty mappings contribute no keys.
    fn flatten_record(&self, record: Record) -> Result<Record, TransformError> {
        let mut out = Record::new();
        let mut pending: Vec<(String, Value)> = record.into_iter().collect();
        pending.reverse();
        while let Some((path, value)) = pending.pop() {
            match value {
                Value::Object(map) => {
                    let mut children: Vec<(String, Value)> = map
                        .into_iter()
                        .map(|(key, child)| (self.child_path(&path, &key), child))
                        .collect();
                    children.reverse();
                    pending.extend(children);
                }
                Value::Array(items) => match self.arrays.handle(&items, &path)? {
                    ArrayOutput::Value(v) => {
                        out.insert(path, v);
                    }
                    ArrayOutput::Merge(m) => out.extend(m),
                },
                leaf => {
                    out.insert(path, leaf);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Debug for Flatten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flatten")
            .field("separator", &self.separator)
            .field("arrays", &self.arrays.spec())
            .finish()
    }
}

impl Transformer for Flatten {
    fn name(&self) -> &str {
        "flatten"
    }

    fn transform(&self, record: Record) -> Result<Record, TransformError> {
        self.flatten_record(record)
    }

    fn spec(&self) -> Option<TransformerSpec> {
        Some(TransformerSpec::Flatten {
            separator: self.separator.clone(),
            arrays: self.arrays.spec()?,
        })
    }
}
