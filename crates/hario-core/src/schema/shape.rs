//! Declarative description of the fields a record must carry.

use std::sync::Arc;

/// Expected JSON type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    /// A JSON number without a fractional part.
    Integer,
    Number,
    Boolean,
    /// Any JSON object; contents are not inspected.
    Mapping,
    Any,
    List(Box<FieldKind>),
    Nested(Arc<Shape>),
    /// The innermost enclosing shape, for self-referential structures.
    Recursive,
}

impl FieldKind {
    pub fn nested(shape: Shape) -> Self {
        FieldKind::Nested(Arc::new(shape))
    }

    pub fn list_of(kind: FieldKind) -> Self {
        FieldKind::List(Box::new(kind))
    }

    pub(crate) fn expected(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Mapping | FieldKind::Nested(_) | FieldKind::Recursive => "mapping",
            FieldKind::Any => "any value",
            FieldKind::List(_) => "sequence",
        }
    }
}

/// Whether a field may be absent or null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Presence {
    /// May be absent or null.
    Optional,
    /// May be absent (a default applies) but not null.
    Defaulted,
    /// Must be present and non-null.
    Required,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            presence: Presence::Optional,
        }
    }

    pub fn defaulted(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            presence: Presence::Defaulted,
        }
    }
}

/// Named, ordered set of field specs. Undeclared keys are always allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    name: String,
    fields: Vec<FieldSpec>,
}

impl Shape {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Derive an extended shape.
    ///
    /// Fields with a name already present replace the base kind but keep the
    /// stricter of the two presences; new names are appended. The result
    /// therefore requires at least everything the base requires.
    pub fn refine(&self, name: impl Into<String>, extra: impl IntoIterator<Item = FieldSpec>) -> Shape {
        let mut fields = self.fields.clone();
        for spec in extra {
            match fields.iter_mut().find(|f| f.name == spec.name) {
                Some(existing) => {
                    existing.presence = existing.presence.max(spec.presence);
                    existing.kind = spec.kind;
                }
                None => fields.push(spec),
            }
        }
        Shape {
            name: name.into(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Shape {
        Shape::new(
            "base",
            [
                FieldSpec::required("a", FieldKind::String),
                FieldSpec::optional("b", FieldKind::Integer),
            ],
        )
    }

    #[test]
    fn refine_appends_new_fields() {
        let refined = base().refine("ext", [FieldSpec::optional("_c", FieldKind::Boolean)]);
        assert_eq!(refined.name(), "ext");
        let names: Vec<_> = refined.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "_c"]);
    }

    #[test]
    fn refine_never_relaxes_a_required_field() {
        let refined = base().refine(
            "ext",
            [
                FieldSpec::optional("a", FieldKind::Any),
                FieldSpec::required("b", FieldKind::Number),
            ],
        );
        let a = refined.field("a").unwrap();
        assert_eq!(a.presence, Presence::Required);
        assert_eq!(a.kind, FieldKind::Any);
        assert_eq!(refined.field("b").unwrap().presence, Presence::Required);
    }
}
