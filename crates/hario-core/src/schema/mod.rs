//! Schema resolution and validation.
//!
//! A [`SchemaRegistry`] maps each raw entry to the most specific [`Schema`]
//! through an ordered list of detectors, then the [`Validator`] checks the
//! entry's shape and decodes it into the schema's typed model.

mod builtin;
mod definition;
mod error;
mod registry;
mod shape;
mod validate;

pub use builtin::{
    devtools, devtools_entry_shape, entry_shape, har_1_2, is_devtools_entry, request_shape,
    response_shape, timings_shape, CHROME_DEVTOOLS, HAR_1_2,
};
pub use definition::{PrepareFn, ResolvedRecord, Schema};
pub use error::{DetectorError, FieldIssue, Problem, SchemaError, ValidationError};
pub use registry::{fallible, Detector, Fallible, SchemaRegistry, SchemaRegistryBuilder};
pub use shape::{FieldKind, FieldSpec, Presence, Shape};
pub use validate::{Validator, DEFAULT_MAX_DEPTH};
pub(crate) use validate::type_name;
