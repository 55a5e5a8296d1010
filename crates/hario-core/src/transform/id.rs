//! Record identifiers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use super::error::TransformError;
use super::path::lookup;
use super::{Transformer, TransformerSpec};
use crate::Record;

const FIELD_SEPARATOR: &str = ":";
/// Digest bytes kept for `by_field` ids (hex-encoded: 32 chars).
const DIGEST_BYTES: usize = 16;

type IdClosure = dyn Fn(&Record) -> Result<String, TransformError> + Send + Sync;

/// Produces the identifier stored by [`set_id`].
#[derive(Clone)]
pub enum IdFn {
    /// Deterministic hash of the values at the given dotted paths.
    ByField(Vec<String>),
    /// Random UUID v4.
    Uuid,
    Custom { name: String, f: Arc<IdClosure> },
}

/// Serializable description of the built-in id functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdSpec {
    ByField { fields: Vec<String> },
    Uuid,
}

impl IdFn {
    pub fn by_field<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdFn::ByField(fields.into_iter().map(Into::into).collect())
    }

    pub fn uuid() -> Self {
        IdFn::Uuid
    }

    pub fn custom<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Record) -> Result<String, TransformError> + Send + Sync + 'static,
    {
        IdFn::Custom {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn generate(&self, record: &Record) -> Result<String, TransformError> {
        match self {
            IdFn::ByField(fields) => hash_fields(record, fields),
            IdFn::Uuid => Ok(uuid::Uuid::new_v4().to_string()),
            IdFn::Custom { f, .. } => f(record),
        }
    }

    pub fn spec(&self) -> Option<IdSpec> {
        match self {
            IdFn::ByField(fields) => Some(IdSpec::ByField {
                fields: fields.clone(),
            }),
            IdFn::Uuid => Some(IdSpec::Uuid),
            IdFn::Custom { .. } => None,
        }
    }

    pub fn from_spec(spec: &IdSpec) -> Self {
        match spec {
            IdSpec::ByField { fields } => IdFn::ByField(fields.clone()),
            IdSpec::Uuid => IdFn::Uuid,
        }
    }

    fn label(&self) -> String {
        match self {
            IdFn::ByField(fields) => format!("by_field({})", fields.join(",")),
            IdFn::Uuid => "uuid".to_string(),
            IdFn::Custom { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for IdFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdFn({})", self.label())
    }
}

fn hash_fields(record: &Record, fields: &[String]) -> Result<String, TransformError> {
    let mut hasher = Sha256::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            hasher.update(FIELD_SEPARATOR.as_bytes());
        }
        match lookup(record, field)? {
            Value::String(s) => hasher.update(s.as_bytes()),
            other => hasher.update(other.to_string().as_bytes()),
        }
    }
    let digest = hasher.finalize();
    Ok(hex::encode(&digest[..DIGEST_BYTES]))
}

/// Stores `id.generate(record)` under `field`, replacing any existing value.
#[derive(Debug, Clone)]
pub struct SetId {
    id: IdFn,
    field: String,
    name: String,
}

pub fn set_id(id: IdFn, field: impl Into<String>) -> SetId {
    let field = field.into();
    let name = format!("set_id[{}]", id.label());
    SetId { id, field, name }
}

impl Transformer for SetId {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, mut record: Record) -> Result<Record, TransformError> {
        let id = self.id.generate(&record)?;
        record.insert(self.field.clone(), Value::String(id));
        Ok(record)
    }

    fn spec(&self) -> Option<TransformerSpec> {
        Some(TransformerSpec::SetId {
            field: self.field.clone(),
            id: self.id.spec()?,
        })
    }
}
