//! Record transformers and the ordered chain that applies them.
//!
//! A transformer maps one [`Record`] to another and must not keep state
//! between calls; the same chain runs concurrently under the parallel
//! strategies. Built-in transformers can describe themselves as a
//! [`TransformerSpec`] so the chain can be rebuilt inside a worker process.

mod enrich;
mod error;
mod flatten;
mod id;
mod normalize;
mod path;

pub use enrich::{domain, Domain};
pub use error::{NotSerializable, StepError, TransformError};
pub use flatten::{
    flatten, flatten_with, ArrayHandler, ArrayOutput, ArraySpec, Flatten, IndexedArrays, JsonArrays,
    DEFAULT_SEPARATOR,
};
pub use id::{set_id, IdFn, IdSpec, SetId};
pub use normalize::{normalize_sizes, normalize_timings, NormalizeSizes, NormalizeTimings};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::Record;

pub trait Transformer: Send + Sync {
    fn name(&self) -> &str;

    fn transform(&self, record: Record) -> Result<Record, TransformError>;

    /// Description used to rebuild this step in another process.
    /// `None` for steps that only exist as code (closures).
    fn spec(&self) -> Option<TransformerSpec> {
        None
    }
}

pub struct FnTransformer<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named transformer.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnTransformer<F>
where
    F: Fn(Record) -> Result<Record, TransformError> + Send + Sync,
{
    FnTransformer {
        name: name.into(),
        f,
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(Record) -> Result<Record, TransformError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, record: Record) -> Result<Record, TransformError> {
        (self.f)(record)
    }
}

/// Serializable form of a built-in transformer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformerSpec {
    SetId { field: String, id: IdSpec },
    NormalizeSizes,
    NormalizeTimings,
    Flatten { separator: String, arrays: ArraySpec },
    Domain { field: String },
}

impl TransformerSpec {
    pub fn build(&self) -> Arc<dyn Transformer> {
        match self {
            TransformerSpec::SetId { field, id } => Arc::new(set_id(IdFn::from_spec(id), field.clone())),
            TransformerSpec::NormalizeSizes => Arc::new(normalize_sizes()),
            TransformerSpec::NormalizeTimings => Arc::new(normalize_timings()),
            TransformerSpec::Flatten { separator, arrays } => Arc::new(Flatten::from_parts(separator, arrays.build())),
            TransformerSpec::Domain { field } => Arc::new(domain(field.clone())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub steps: Vec<TransformerSpec>,
}

/// Ordered transformers. Cloning shares the steps.
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Arc<dyn Transformer>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl Transformer + 'static) {
        self.steps.push(Arc::new(step));
    }

    pub fn push_shared(&mut self, step: Arc<dyn Transformer>) {
        self.steps.push(step);
    }

    /// Move every step of `other` to the end of this chain.
    pub fn append(&mut self, other: Chain) {
        self.steps.extend(other.steps);
    }

    pub fn then(mut self, step: impl Transformer + 'static) -> Self {
        self.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name())
    }

    /// Run every step in order; the first failure stops the record.
    pub fn apply(&self, record: Record) -> Result<Record, StepError> {
        self.steps.iter().try_fold(record, |record, step| {
            step.transform(record).map_err(|error| StepError {
                step: step.name().to_string(),
                error,
            })
        })
    }

    pub fn to_spec(&self) -> Result<ChainSpec, NotSerializable> {
        let steps = self
            .steps
            .iter()
            .map(|step| {
                step.spec().ok_or_else(|| NotSerializable {
                    name: step.name().to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ChainSpec { steps })
    }

    pub fn from_spec(spec: &ChainSpec) -> Self {
        Self {
            steps: spec.steps.iter().map(TransformerSpec::build).collect(),
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
