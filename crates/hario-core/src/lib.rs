pub mod config;
pub mod logging;

pub mod bench;
pub mod har;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod transform;

/// A plain, insertion-ordered JSON mapping: the unit every transformer and
/// strategy works on once an entry has been validated and dumped.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// An entry mapping as it comes off the wire, before schema resolution.
pub type RawRecord = Record;

pub use config::{ConfigError, HarioConfig, PipelineConfig, Strategy, WorkerCommand};
pub use har::{HarLog, LoadError};
pub use model::{DevToolsEntry, Entry, HarEntry};
pub use pipeline::{CancelToken, Pipeline, PipelineError};
pub use schema::{ResolvedRecord, Schema, SchemaError, SchemaRegistry, ValidationError};
pub use transform::{Chain, IdFn, TransformError, Transformer};
