//! Ordered (detector, schema) rules with a default fallback.

use std::fmt;
use std::sync::Arc;

use super::builtin;
use super::definition::{ResolvedRecord, Schema};
use super::error::{DetectorError, SchemaError};
use super::validate::Validator;
use crate::RawRecord;

/// Decides whether a raw record belongs to a more specific schema.
pub trait Detector: Send + Sync {
    fn matches(&self, raw: &RawRecord) -> Result<bool, DetectorError>;
}

impl<F> Detector for F
where
    F: Fn(&RawRecord) -> bool + Send + Sync,
{
    fn matches(&self, raw: &RawRecord) -> Result<bool, DetectorError> {
        Ok(self(raw))
    }
}

/// Detector built from a closure that can fail.
pub struct Fallible<F>(F);

pub fn fallible<F>(f: F) -> Fallible<F>
where
    F: Fn(&RawRecord) -> Result<bool, DetectorError> + Send + Sync,
{
    Fallible(f)
}

impl<F> Detector for Fallible<F>
where
    F: Fn(&RawRecord) -> Result<bool, DetectorError> + Send + Sync,
{
    fn matches(&self, raw: &RawRecord) -> Result<bool, DetectorError> {
        (self.0)(raw)
    }
}

#[derive(Clone)]
struct Rule {
    detector: Arc<dyn Detector>,
    schema: Schema,
}

/// Immutable resolver: rules are consulted in registration order and the
/// first match wins; the default schema applies when nothing matches.
#[derive(Clone)]
pub struct SchemaRegistry {
    rules: Vec<Rule>,
    default: Schema,
    validator: Validator,
}

pub struct SchemaRegistryBuilder {
    rules: Vec<Rule>,
    default: Schema,
    validator: Validator,
}

impl SchemaRegistryBuilder {
    /// Append a rule. Earlier rules take precedence over this one.
    pub fn register(mut self, detector: impl Detector + 'static, schema: Schema) -> Self {
        self.rules.push(Rule {
            detector: Arc::new(detector),
            schema,
        });
        self
    }

    pub fn default_schema(mut self, schema: Schema) -> Self {
        self.default = schema;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.validator = Validator::new(max_depth);
        self
    }

    pub fn build(self) -> SchemaRegistry {
        SchemaRegistry {
            rules: self.rules,
            default: self.default,
            validator: self.validator,
        }
    }
}

impl SchemaRegistry {
    pub fn builder(default: Schema) -> SchemaRegistryBuilder {
        SchemaRegistryBuilder {
            rules: Vec::new(),
            default,
            validator: Validator::default(),
        }
    }

    /// HAR 1.2 by default, Chrome DevTools when DevTools keys are present.
    pub fn standard() -> Self {
        Self::builder(builtin::har_1_2())
            .register(builtin::is_devtools_entry, builtin::devtools())
            .build()
    }

    /// A builder holding a copy of this registry's rules, for extension.
    pub fn to_builder(&self) -> SchemaRegistryBuilder {
        SchemaRegistryBuilder {
            rules: self.rules.clone(),
            default: self.default.clone(),
            validator: self.validator,
        }
    }

    pub fn default_schema(&self) -> &Schema {
        &self.default
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.rules.iter().map(|r| &r.schema)
    }

    pub fn resolve(&self, raw: &RawRecord) -> Result<&Schema, DetectorError> {
        for rule in &self.rules {
            if rule.detector.matches(raw)? {
                return Ok(&rule.schema);
            }
        }
        Ok(&self.default)
    }

    pub fn validate(&self, raw: RawRecord) -> Result<ResolvedRecord, SchemaError> {
        let schema = self.resolve(&raw)?;
        tracing::trace!(schema = schema.name(), "resolved entry schema");
        Ok(self.validator.validate(schema, raw)?)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("rules", &self.schemas().map(Schema::name).collect::<Vec<_>>())
            .field("default", &self.default.name())
            .field("validator", &self.validator)
            .finish()
    }
}
