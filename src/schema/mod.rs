//! Walkable description of the fixed project document schema.
//!
//! The schema is data, not code: the validator, the default merger, unknown
//! key pruning and the JSON Schema export all walk the same [`Shape`] tree.

mod definition;
mod export;
mod validate;

pub use definition::project_schema;
pub use export::json_schema;
pub use validate::{
    prune_unknown, validate, validate_against, ValidationError, ValidationErrors,
};

/// Structural type of one node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Anything, including null.
    Any,
    Bool,
    Number,
    String { min_len: usize },
    /// One of a fixed set of string literals.
    Literal(&'static [&'static str]),
    Array(Box<Shape>),
    /// Fixed set of named fields; keys outside the set are unknown.
    Object(Vec<Field>),
    /// Free-form keys, each value of the given shape.
    Record(Box<Shape>),
}

/// A named member of an [`Shape::Object`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

impl Shape {
    pub fn string() -> Self {
        Shape::String { min_len: 0 }
    }

    pub fn non_empty_string() -> Self {
        Shape::String { min_len: 1 }
    }

    pub fn array_of(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    pub fn record_of(value: Shape) -> Self {
        Shape::Record(Box::new(value))
    }

    /// Looks up a field of an object shape.
    pub fn field(&self, name: &str) -> Option<&Field> {
        match self {
            Shape::Object(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            Shape::Object(fields) => fields,
            _ => &[],
        }
    }

    /// Human-readable expectation, used in validation messages.
    pub fn describe(&self) -> String {
        match self {
            Shape::Any => "any value".to_string(),
            Shape::Bool => "boolean".to_string(),
            Shape::Number => "number".to_string(),
            Shape::String { min_len: 0 } => "string".to_string(),
            Shape::String { min_len } => format!("string of at least {min_len} character(s)"),
            Shape::Literal(values) => format!("one of: {}", values.join(", ")),
            Shape::Array(item) => format!("array of {}", item.describe()),
            Shape::Object(_) => "object".to_string(),
            Shape::Record(value) => format!("object of {}", value.describe()),
        }
    }
}

impl Field {
    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
        }
    }

    pub fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: true,
        }
    }
}

/// Joins an object key onto a dotted field path.
pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Joins an array index onto a field path.
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}
