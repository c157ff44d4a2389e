use toml::Value;

use super::source::{SettingsEntry, SettingsSource};
use super::SettingsError;

/// Environment layer: `PREFIX<sep>SECTION<sep>FIELD=value`.
///
/// Segments after the prefix are lowercased and become the settings path.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(
        prefix: impl Into<String>,
        separator: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(SettingsError::EmptySeparator);
        }
        Ok(Self {
            prefix: prefix.into(),
            separator,
        })
    }

    fn entries_from(&self, vars: impl Iterator<Item = (String, String)>) -> Vec<SettingsEntry> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);

        vars.filter_map(|(key, value)| {
            let path_str = key.strip_prefix(&prefix_with_sep)?;
            if path_str.is_empty() {
                return None;
            }
            let path = path_str
                .split(self.separator.as_str())
                .map(str::to_lowercase)
                .collect();
            Some(SettingsEntry::at_path(path, coerce_value(&value)))
        })
        .collect()
    }
}

impl SettingsSource for EnvSource {
    fn entries(&self) -> Result<Vec<SettingsEntry>, SettingsError> {
        Ok(self.entries_from(std::env::vars()))
    }
}

/// Picks the most specific TOML type for a raw environment string.
fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    let digits = s.strip_prefix('-').unwrap_or(s);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}
