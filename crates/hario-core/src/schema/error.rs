use std::fmt;

use thiserror::Error;

/// What is wrong with one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    TooDeep {
        limit: usize,
    },
    /// The record passed the shape check but could not be decoded.
    Malformed(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => write!(f, "field required"),
            Problem::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Problem::TooDeep { limit } => write!(f, "nesting deeper than {limit} levels"),
            Problem::Malformed(msg) => write!(f, "{msg}"),
        }
    }
}

/// One offending field, addressed by a dotted path with `[i]` for list items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub path: String,
    pub problem: Problem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<record>: {}", self.problem)
        } else {
            write!(f, "{}: {}", self.path, self.problem)
        }
    }
}

/// A record failed its schema. Carries every offending field, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record does not match schema `{schema}`: {}", join_issues(.issues))]
pub struct ValidationError {
    pub schema: String,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(schema: impl Into<String>, issues: Vec<FieldIssue>) -> Self {
        Self {
            schema: schema.into(),
            issues,
        }
    }

    pub(crate) fn single(schema: impl Into<String>, path: impl Into<String>, problem: Problem) -> Self {
        Self::new(
            schema,
            vec![FieldIssue {
                path: path.into(),
                problem,
            }],
        )
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|i| i.path.as_str())
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.paths().any(|p| p == path)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raised by a detector; resolution stops and the error is passed on as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema detector failed: {message}")]
pub struct DetectorError {
    message: String,
}

impl DetectorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_issue() {
        let err = ValidationError::new(
            "har-1.2",
            vec![
                FieldIssue {
                    path: "timings".into(),
                    problem: Problem::Missing,
                },
                FieldIssue {
                    path: "response.status".into(),
                    problem: Problem::WrongType {
                        expected: "integer",
                        found: "string",
                    },
                },
            ],
        );
        let msg = err.to_string();
        assert!(msg.contains("timings: field required"), "{msg}");
        assert!(msg.contains("response.status: expected integer, found string"), "{msg}");
        assert!(err.has_path("timings"));
        assert!(!err.has_path("request"));
    }
}
