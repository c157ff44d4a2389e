use serde_json::{json, Map, Value};

use super::{project_schema, Shape};

const DOCS_URL: &str = "https://docs.reliverse.org/cli";

/// Renders the project schema as a draft-07 JSON Schema document.
pub fn json_schema() -> Value {
    let mut root = shape_to_json(project_schema());
    if let Value::Object(map) = &mut root {
        let mut header = Map::new();
        header.insert(
            "$schema".into(),
            Value::String("http://json-schema.org/draft-07/schema#".into()),
        );
        header.insert("title".into(), Value::String("rse configuration schema".into()));
        header.insert("description".into(), Value::String(DOCS_URL.into()));
        header.append(map);
        *map = header;
    }
    root
}

fn shape_to_json(shape: &Shape) -> Value {
    match shape {
        Shape::Any => json!({}),
        Shape::Bool => json!({"type": "boolean"}),
        Shape::Number => json!({"type": "number"}),
        Shape::String { min_len: 0 } => json!({"type": "string"}),
        Shape::String { min_len } => json!({"type": "string", "minLength": min_len}),
        Shape::Literal(values) => json!({"type": "string", "enum": values}),
        Shape::Array(item) => json!({"type": "array", "items": shape_to_json(item)}),
        Shape::Record(value) => {
            json!({"type": "object", "additionalProperties": shape_to_json(value)})
        }
        Shape::Object(fields) => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|f| (f.name.to_string(), shape_to_json(&f.shape)))
                .collect();
            let required: Vec<&str> = fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name)
                .collect();

            let mut object = json!({"type": "object", "properties": properties});
            if !required.is_empty() {
                object["required"] = json!(required);
            }
            object
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_lists_required_and_enums() {
        let schema = json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["title"], "rse configuration schema");
        assert_eq!(schema["required"], json!(["projectName", "projectAuthor"]));

        let quote = &schema["properties"]["codeStyle"]["properties"]["quoteMark"];
        assert_eq!(quote["enum"], json!(["single", "double"]));
        assert_eq!(
            schema["properties"]["customRules"]["additionalProperties"],
            json!({})
        );
    }

    #[test]
    fn test_header_keys_come_first() {
        let schema = json_schema();
        let keys: Vec<&String> = schema.as_object().unwrap().keys().take(3).collect();
        assert_eq!(keys, vec!["$schema", "title", "description"]);
    }
}
