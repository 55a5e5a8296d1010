//! Byte stream to [`HarLog`]: envelope checks, then per-entry resolution.

use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

use super::error::LoadError;
use super::HarLog;
use crate::model::{Browser, Creator, Page};
use crate::schema::{
    type_name, FieldKind, FieldSpec, Problem, ResolvedRecord, SchemaError, SchemaRegistry, Shape,
    ValidationError,
};
use crate::Record;

const ENVELOPE: &str = "har-log";

pub fn parse_path(path: &Path, registry: &SchemaRegistry) -> Result<HarLog, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_slice(&bytes, registry)
}

pub fn parse_reader(mut reader: impl Read, registry: &SchemaRegistry) -> Result<HarLog, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(LoadError::Read)?;
    parse_slice(&bytes, registry)
}

pub fn parse_slice(bytes: &[u8], registry: &SchemaRegistry) -> Result<HarLog, LoadError> {
    let value: Value = serde_json::from_slice(bytes)?;
    validate_value(value, registry)
}

/// Check the `{"log": {...}}` envelope of an already-parsed document and
/// validate every entry through `registry`. Stops at the first bad entry.
pub fn validate_value(value: Value, registry: &SchemaRegistry) -> Result<HarLog, LoadError> {
    let mut root = match value {
        Value::Object(map) => map,
        other => {
            return Err(envelope_error(
                "",
                Problem::WrongType {
                    expected: "mapping",
                    found: type_name(&other),
                },
            ))
        }
    };
    let mut log = match root.remove("log") {
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(envelope_error(
                "log",
                Problem::WrongType {
                    expected: "mapping",
                    found: type_name(&other),
                },
            ))
        }
        None => return Err(envelope_error("log", Problem::Missing)),
    };

    let issues = registry.validator().check_at(&log_shape(), &log, "log");
    if !issues.is_empty() {
        return Err(LoadError::Envelope(ValidationError::new(ENVELOPE, issues)));
    }

    let raw_entries = match log.remove("entries") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let header: LogHeader = serde_json::from_value(Value::Object(log))
        .map_err(|e| envelope_error("log", Problem::Malformed(e.to_string())))?;

    let entries = raw_entries
        .into_iter()
        .enumerate()
        .map(|(index, item)| resolve_entry(item, registry).map_err(|source| LoadError::Entry { index, source }))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(version = %header.version, entries = entries.len(), "loaded HAR log");
    Ok(HarLog {
        version: header.version,
        creator: header.creator,
        browser: header.browser,
        pages: header.pages,
        entries,
        extra: header.extra,
    })
}

fn resolve_entry(item: Value, registry: &SchemaRegistry) -> Result<ResolvedRecord, SchemaError> {
    match item {
        Value::Object(raw) => registry.validate(raw),
        other => Err(SchemaError::Validation(ValidationError::single(
            registry.default_schema().name(),
            "",
            Problem::WrongType {
                expected: "mapping",
                found: type_name(&other),
            },
        ))),
    }
}

fn envelope_error(path: &str, problem: Problem) -> LoadError {
    LoadError::Envelope(ValidationError::single(ENVELOPE, path, problem))
}

/// Everything in `log` except the entries.
#[derive(Deserialize)]
struct LogHeader {
    version: String,
    creator: Creator,
    browser: Option<Browser>,
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(flatten)]
    extra: Record,
}

fn creator_shape(name: &str) -> Shape {
    Shape::new(
        name,
        [
            FieldSpec::required("name", FieldKind::String),
            FieldSpec::required("version", FieldKind::String),
        ],
    )
}

fn page_shape() -> Shape {
    let timings = Shape::new(
        "pageTimings",
        [
            FieldSpec::optional("onContentLoad", FieldKind::Number),
            FieldSpec::optional("onLoad", FieldKind::Number),
        ],
    );
    Shape::new(
        "page",
        [
            FieldSpec::required("startedDateTime", FieldKind::String),
            FieldSpec::required("id", FieldKind::String),
            FieldSpec::required("title", FieldKind::String),
            FieldSpec::required("pageTimings", FieldKind::nested(timings)),
        ],
    )
}

/// Entries are only checked for being a list here; each one is validated
/// against its own schema afterwards.
fn log_shape() -> Shape {
    Shape::new(
        "log",
        [
            FieldSpec::required("version", FieldKind::String),
            FieldSpec::required("creator", FieldKind::nested(creator_shape("creator"))),
            FieldSpec::optional("browser", FieldKind::nested(creator_shape("browser"))),
            FieldSpec::defaulted("pages", FieldKind::list_of(FieldKind::nested(page_shape()))),
            FieldSpec::required("entries", FieldKind::list_of(FieldKind::Any)),
        ],
    )
}
