//! Structural validation: collects every error, never just the first.

use std::fmt;

use serde_json::Value;

use super::{index_path, join_path, project_schema, Shape};
use crate::document::ConfigDocument;

/// One structural problem at a field path.
///
/// `Display` prints the path and message only; the observed value may hold
/// user data and is kept for programmatic inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    pub observed: Value,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        };
        write!(f, "{path}: {}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The ordered error set produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Field paths in report order.
    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.path.as_str()).collect()
    }

    fn push(&mut self, path: &str, message: impl Into<String>, observed: &Value) {
        self.0.push(ValidationError {
            path: path.to_string(),
            message: message.into(),
            observed: observed.clone(),
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validates a value against the project schema.
pub fn validate(value: &Value) -> Result<ConfigDocument, ValidationErrors> {
    let errors = validate_against(project_schema(), value);
    if !errors.is_empty() {
        return Err(errors);
    }
    ConfigDocument::from_value(value.clone()).map_err(|observed| {
        let mut errors = ValidationErrors::default();
        errors.push("", "expected object", &observed);
        errors
    })
}

/// Validates a value against any shape, returning all errors in document order.
pub fn validate_against(shape: &Shape, value: &Value) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    check(shape, value, "", &mut errors);
    errors
}

fn check(shape: &Shape, value: &Value, path: &str, errors: &mut ValidationErrors) {
    match shape {
        Shape::Any => {}
        Shape::Bool => {
            if !value.is_boolean() {
                errors.push(path, "expected boolean", value);
            }
        }
        Shape::Number => {
            if !value.is_number() {
                errors.push(path, "expected number", value);
            }
        }
        Shape::String { min_len } => match value.as_str() {
            Some(s) if s.chars().count() >= *min_len => {}
            _ => errors.push(path, format!("expected {}", shape.describe()), value),
        },
        Shape::Literal(allowed) => match value.as_str() {
            Some(s) if allowed.iter().any(|a| *a == s) => {}
            _ => errors.push(path, format!("expected {}", shape.describe()), value),
        },
        Shape::Array(item) => match value.as_array() {
            Some(items) => {
                for (i, element) in items.iter().enumerate() {
                    check(item, element, &index_path(path, i), errors);
                }
            }
            None => errors.push(path, "expected array", value),
        },
        Shape::Record(inner) => match value.as_object() {
            Some(map) => {
                for (key, element) in map {
                    check(inner, element, &join_path(path, key), errors);
                }
            }
            None => errors.push(path, "expected object", value),
        },
        Shape::Object(fields) => {
            let Some(map) = value.as_object() else {
                errors.push(path, "expected object", value);
                return;
            };
            for field in fields {
                let field_path = join_path(path, field.name);
                match map.get(field.name) {
                    Some(element) => check(&field.shape, element, &field_path, errors),
                    None if field.required => {
                        errors.push(&field_path, "required field is missing", &Value::Null);
                    }
                    None => {}
                }
            }
            for (key, element) in map {
                if shape.field(key).is_none() {
                    errors.push(&join_path(path, key), "unknown field", element);
                }
            }
        }
    }
}

/// Removes keys the schema does not know, returning their paths.
///
/// Record contents are free-form and never pruned.
pub fn prune_unknown(shape: &Shape, value: &mut Value) -> Vec<String> {
    let mut pruned = Vec::new();
    prune(shape, value, "", &mut pruned);
    pruned
}

fn prune(shape: &Shape, value: &mut Value, path: &str, pruned: &mut Vec<String>) {
    match (shape, value) {
        (Shape::Object(fields), Value::Object(map)) => {
            map.retain(|key, _| {
                let known = fields.iter().any(|f| f.name == key.as_str());
                if !known {
                    pruned.push(join_path(path, key));
                }
                known
            });
            for field in fields {
                if let Some(child) = map.get_mut(field.name) {
                    prune(&field.shape, child, &join_path(path, field.name), pruned);
                }
            }
        }
        (Shape::Array(item), Value::Array(items)) => {
            for (i, element) in items.iter_mut().enumerate() {
                prune(item, element, &index_path(path, i), pruned);
            }
        }
        _ => {}
    }
}
