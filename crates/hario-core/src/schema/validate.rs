//! Shape checking and typed decoding of raw records.

use serde_json::Value;

use super::definition::{ResolvedRecord, Schema};
use super::error::{FieldIssue, Problem, ValidationError};
use super::shape::{FieldKind, Presence, Shape};
use crate::{RawRecord, Record};

pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    max_depth: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Validator {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Every issue found in `record`, with paths relative to the record.
    pub fn check(&self, shape: &Shape, record: &Record) -> Vec<FieldIssue> {
        self.check_at(shape, record, "")
    }

    /// Like [`Validator::check`], with every path prefixed by `base`.
    pub fn check_at(&self, shape: &Shape, record: &Record, base: &str) -> Vec<FieldIssue> {
        let mut walk = Walk {
            max_depth: self.max_depth,
            issues: Vec::new(),
        };
        walk.object(shape, record, base, 1);
        walk.issues
    }

    /// Check `raw` against `schema` and decode it into the schema's model.
    ///
    /// Keys the shape does not declare are carried through untouched.
    pub fn validate(&self, schema: &Schema, mut raw: RawRecord) -> Result<ResolvedRecord, ValidationError> {
        schema.prepare(&mut raw);
        let issues = self.check(schema.shape(), &raw);
        if !issues.is_empty() {
            return Err(ValidationError::new(schema.name(), issues));
        }
        let entry = schema
            .decode(raw)
            .map_err(|e| ValidationError::single(schema.name(), "", Problem::Malformed(e.to_string())))?;
        Ok(ResolvedRecord::new(schema.clone(), entry))
    }
}

struct Walk {
    max_depth: usize,
    issues: Vec<FieldIssue>,
}

impl Walk {
    fn push(&mut self, path: &str, problem: Problem) {
        self.issues.push(FieldIssue {
            path: path.to_string(),
            problem,
        });
    }

    fn object(&mut self, shape: &Shape, obj: &Record, path: &str, depth: usize) {
        if depth > self.max_depth {
            self.push(
                path,
                Problem::TooDeep {
                    limit: self.max_depth,
                },
            );
            return;
        }
        for spec in shape.fields() {
            let field_path = join(path, &spec.name);
            match obj.get(&spec.name) {
                None => {
                    if spec.presence == Presence::Required {
                        self.push(&field_path, Problem::Missing);
                    }
                }
                Some(Value::Null) => {
                    if spec.presence != Presence::Optional {
                        self.push(
                            &field_path,
                            Problem::WrongType {
                                expected: spec.kind.expected(),
                                found: "null",
                            },
                        );
                    }
                }
                Some(value) => self.value(&spec.kind, shape, value, &field_path, depth),
            }
        }
    }

    fn value(&mut self, kind: &FieldKind, enclosing: &Shape, value: &Value, path: &str, depth: usize) {
        match (kind, value) {
            (FieldKind::Any, _)
            | (FieldKind::String, Value::String(_))
            | (FieldKind::Boolean, Value::Bool(_))
            | (FieldKind::Number, Value::Number(_))
            | (FieldKind::Mapping, Value::Object(_)) => {}
            (FieldKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {}
            (FieldKind::List(inner), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.value(inner, enclosing, item, &format!("{path}[{i}]"), depth);
                }
            }
            (FieldKind::Nested(shape), Value::Object(obj)) => self.object(shape, obj, path, depth + 1),
            (FieldKind::Recursive, Value::Object(obj)) => self.object(enclosing, obj, path, depth + 1),
            _ => self.push(
                path,
                Problem::WrongType {
                    expected: kind.expected(),
                    found: type_name(value),
                },
            ),
        }
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::shape::FieldSpec;
    use serde_json::json;

    fn object(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn header() -> Shape {
        Shape::new(
            "header",
            [
                FieldSpec::required("name", FieldKind::String),
                FieldSpec::required("value", FieldKind::String),
            ],
        )
    }

    fn node() -> Shape {
        Shape::new(
            "node",
            [
                FieldSpec::required("id", FieldKind::Integer),
                FieldSpec::optional("next", FieldKind::Recursive),
            ],
        )
    }

    fn chain(depth: usize) -> Record {
        let mut value = json!({"id": depth});
        for id in (1..depth).rev() {
            value = json!({"id": id, "next": value});
        }
        object(value)
    }

    #[test]
    fn collects_every_offending_path() {
        let shape = Shape::new(
            "req",
            [
                FieldSpec::required("url", FieldKind::String),
                FieldSpec::required("status", FieldKind::Integer),
                FieldSpec::defaulted("headers", FieldKind::list_of(FieldKind::nested(header()))),
            ],
        );
        let record = object(json!({
            "status": "200",
            "headers": [
                {"name": "a", "value": "1"},
                {"name": "b", "value": "2"},
                {"value": "3"}
            ]
        }));
        let issues = Validator::default().check(&shape, &record);
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["url", "status", "headers[2].name"]);
        assert_eq!(issues[0].problem, Problem::Missing);
        assert_eq!(
            issues[1].problem,
            Problem::WrongType {
                expected: "integer",
                found: "string"
            }
        );
    }

    #[test]
    fn null_handling_follows_presence() {
        let shape = Shape::new(
            "s",
            [
                FieldSpec::required("a", FieldKind::String),
                FieldSpec::optional("b", FieldKind::String),
                FieldSpec::defaulted("c", FieldKind::list_of(FieldKind::Any)),
            ],
        );
        let record = object(json!({"a": null, "b": null, "c": null}));
        let issues = Validator::default().check(&shape, &record);
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["a", "c"]);
    }

    #[test]
    fn integer_rejects_fractional_numbers() {
        let shape = Shape::new("s", [FieldSpec::required("n", FieldKind::Integer)]);
        let issues = Validator::default().check(&shape, &object(json!({"n": 1.5})));
        assert_eq!(issues.len(), 1);
        let ok = Validator::default().check(&shape, &object(json!({"n": -1})));
        assert!(ok.is_empty());
    }

    #[test]
    fn recursive_shapes_validate_to_the_depth_limit() {
        let validator = Validator::new(16);
        assert!(validator.check(&node(), &chain(16)).is_empty());

        let issues = validator.check(&node(), &chain(17));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].problem, Problem::TooDeep { limit: 16 });
        assert!(issues[0].path.ends_with(".next"));
    }

    #[test]
    fn recursion_errors_carry_nested_paths() {
        let record = object(json!({"id": 1, "next": {"id": 2, "next": {"id": "x"}}}));
        let issues = Validator::default().check(&node(), &record);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "next.next.id");
    }

    #[test]
    fn check_at_prefixes_paths() {
        let issues = Validator::default().check_at(&header(), &Record::new(), "log.creator");
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["log.creator.name", "log.creator.value"]);
    }
}
