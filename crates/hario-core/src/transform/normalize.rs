//! Replace HAR's negative "not available" markers with zeros.

use serde_json::Value;

use super::error::TransformError;
use super::path::lookup_mut;
use super::{Transformer, TransformerSpec};
use crate::Record;

const SIZE_FIELDS: [&[&str]; 5] = [
    &["request", "headersSize"],
    &["request", "bodySize"],
    &["response", "headersSize"],
    &["response", "bodySize"],
    &["response", "content", "size"],
];

const TIMING_FIELDS: [&[&str]; 7] = [
    &["timings", "blocked"],
    &["timings", "dns"],
    &["timings", "connect"],
    &["timings", "send"],
    &["timings", "wait"],
    &["timings", "receive"],
    &["timings", "ssl"],
];

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeSizes;

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeTimings;

/// Negative integer size fields become `0`. Non-integral sizes are left alone.
pub fn normalize_sizes() -> NormalizeSizes {
    NormalizeSizes
}

/// Negative timing fields become `0.0`.
pub fn normalize_timings() -> NormalizeTimings {
    NormalizeTimings
}

impl Transformer for NormalizeSizes {
    fn name(&self) -> &str {
        "normalize_sizes"
    }

    fn transform(&self, mut record: Record) -> Result<Record, TransformError> {
        for path in SIZE_FIELDS {
            clamp_negative(&mut record, path, Value::is_i64, || Value::from(0));
        }
        Ok(record)
    }

    fn spec(&self) -> Option<TransformerSpec> {
        Some(TransformerSpec::NormalizeSizes)
    }
}

impl Transformer for NormalizeTimings {
    fn name(&self) -> &str {
        "normalize_timings"
    }

    fn transform(&self, mut record: Record) -> Result<Record, TransformError> {
        for path in TIMING_FIELDS {
            clamp_negative(&mut record, path, Value::is_number, || Value::from(0.0));
        }
        Ok(record)
    }

    fn spec(&self) -> Option<TransformerSpec> {
        Some(TransformerSpec::NormalizeTimings)
    }
}

/// Absent paths and non-mapping intermediates are left alone.
fn clamp_negative(record: &mut Record, path: &[&str], applies: fn(&Value) -> bool, zero: impl Fn() -> Value) {
    if let Some(value) = lookup_mut(record, path) {
        if applies(value) && value.as_f64().is_some_and(|n| n < 0.0) {
            *value = zero();
        }
    }
}
