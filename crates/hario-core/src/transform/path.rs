use serde_json::Value;

use super::error::TransformError;
use crate::Record;

/// Resolve a dotted path (`"request.url"`) inside a record.
///
/// A null anywhere on the path, including the final value, is an error.
pub(crate) fn lookup<'a>(record: &'a Record, path: &str) -> Result<&'a Value, TransformError> {
    let mut segments = path.split('.');
    let first = segments.next().unwrap_or(path);
    let mut current = record.get(first).ok_or_else(|| missing(path))?;
    for segment in segments {
        current = match current {
            Value::Null => return Err(null(path)),
            Value::Object(map) => map.get(segment).ok_or_else(|| missing(path))?,
            _ => {
                return Err(TransformError::NotMapping {
                    path: path.to_string(),
                })
            }
        };
    }
    if current.is_null() {
        return Err(null(path));
    }
    Ok(current)
}

/// Mutable access to a nested value; `None` when any step is absent or not a mapping.
pub(crate) fn lookup_mut<'a>(record: &'a mut Record, path: &[&str]) -> Option<&'a mut Value> {
    let (last, parents) = path.split_last()?;
    let mut current = record;
    for key in parents {
        current = current.get_mut(*key)?.as_object_mut()?;
    }
    current.get_mut(*last)
}

fn missing(path: &str) -> TransformError {
    TransformError::MissingField {
        path: path.to_string(),
    }
}

fn null(path: &str) -> TransformError {
    TransformError::NullField {
        path: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Record {
        match json!({
            "request": {"url": "https://a.test/", "nonexistent": null},
            "startedDateTime": "2025-01-01T00:00:00Z"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn resolves_nested_values() {
        let r = record();
        assert_eq!(lookup(&r, "request.url").unwrap(), "https://a.test/");
        assert_eq!(lookup(&r, "startedDateTime").unwrap(), "2025-01-01T00:00:00Z");
    }

    #[test]
    fn reports_missing_null_and_non_mapping() {
        let r = record();
        assert_eq!(
            lookup(&r, "request.missing").unwrap_err(),
            TransformError::MissingField {
                path: "request.missing".into()
            }
        );
        assert_eq!(
            lookup(&r, "request.nonexistent").unwrap_err(),
            TransformError::NullField {
                path: "request.nonexistent".into()
            }
        );
        assert_eq!(
            lookup(&r, "request.url.something").unwrap_err(),
            TransformError::NotMapping {
                path: "request.url.something".into()
            }
        );
    }

    #[test]
    fn lookup_mut_stops_at_non_mappings() {
        let mut r = record();
        assert!(lookup_mut(&mut r, &["request", "url"]).is_some());
        assert!(lookup_mut(&mut r, &["request", "url", "x"]).is_none());
        assert!(lookup_mut(&mut r, &["response", "status"]).is_none());
    }
}
