//! The per-project settings document and its on-disk variants.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Published location of the document's JSON Schema.
pub const SCHEMA_URL: &str = "https://reliverse.org/schema.json";

/// Schema reference used by projects in developer mode.
pub const SCHEMA_DEV: &str = "./schema.json";

/// Placeholder for values the engine could not determine.
pub const UNKNOWN_VALUE: &str = "unknown";

/// On-disk format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigVariant {
    /// Comment and trailing-comma tolerant data file; machine-repairable.
    StructuredText,
    /// Source module exporting the document; read-only to the engine.
    ScriptDocument,
}

impl ConfigVariant {
    pub fn extension(self) -> &'static str {
        match self {
            ConfigVariant::StructuredText => "jsonc",
            ConfigVariant::ScriptDocument => "ts",
        }
    }

    /// Detects the variant from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "jsonc" | "json" => Some(ConfigVariant::StructuredText),
            "ts" => Some(ConfigVariant::ScriptDocument),
            _ => None,
        }
    }

    pub fn is_writable(self) -> bool {
        matches!(self, ConfigVariant::StructuredText)
    }
}

impl fmt::Display for ConfigVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigVariant::StructuredText => write!(f, "structured-text"),
            ConfigVariant::ScriptDocument => write!(f, "script-document"),
        }
    }
}

/// A project config document: an insertion-ordered object tree.
///
/// Every read produces a fresh document; nothing is shared between callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Map<String, Value>);

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a value, returning it back if it is not an object.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ConfigDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
