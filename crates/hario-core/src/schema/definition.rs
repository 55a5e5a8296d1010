use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::shape::Shape;
use crate::model::HarEntry;
use crate::{RawRecord, Record};

/// Adjusts a raw record in place before it is checked against the shape.
pub type PrepareFn = fn(&Shape, &mut RawRecord);

type DecodeFn = fn(Value) -> Result<Box<dyn HarEntry>, serde_json::Error>;

/// A named record shape plus the typed model it decodes into.
#[derive(Clone)]
pub struct Schema {
    name: Arc<str>,
    version: Arc<str>,
    shape: Arc<Shape>,
    decode: DecodeFn,
    prepare: Option<PrepareFn>,
}

impl Schema {
    /// Schema whose validated records decode into `T`.
    pub fn of<T>(name: &str, version: &str, shape: Shape) -> Self
    where
        T: HarEntry + DeserializeOwned,
    {
        Self {
            name: name.into(),
            version: version.into(),
            shape: Arc::new(shape),
            decode: decode_as::<T>,
            prepare: None,
        }
    }

    pub fn with_prepare(mut self, prepare: PrepareFn) -> Self {
        self.prepare = Some(prepare);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) fn prepare(&self, raw: &mut RawRecord) {
        if let Some(prepare) = self.prepare {
            prepare(&self.shape, raw);
        }
    }

    pub(crate) fn decode(&self, raw: RawRecord) -> Result<Box<dyn HarEntry>, serde_json::Error> {
        (self.decode)(Value::Object(raw))
    }
}

fn decode_as<T>(value: Value) -> Result<Box<dyn HarEntry>, serde_json::Error>
where
    T: HarEntry + DeserializeOwned,
{
    let entry: T = serde_json::from_value(value)?;
    Ok(Box::new(entry))
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("shape", &self.shape.name())
            .finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

/// A validated entry together with the schema that accepted it.
#[derive(Debug)]
pub struct ResolvedRecord {
    schema: Schema,
    entry: Box<dyn HarEntry>,
}

impl ResolvedRecord {
    pub(crate) fn new(schema: Schema, entry: Box<dyn HarEntry>) -> Self {
        Self { schema, entry }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn entry(&self) -> &dyn HarEntry {
        self.entry.as_ref()
    }

    pub fn downcast_ref<T: HarEntry>(&self) -> Option<&T> {
        self.entry.as_any().downcast_ref::<T>()
    }

    pub fn into_entry(self) -> Box<dyn HarEntry> {
        self.entry
    }

    /// Plain mapping with wire field names and every extra key.
    pub fn to_record(&self) -> Result<Record, serde_json::Error> {
        self.entry.to_record()
    }
}
