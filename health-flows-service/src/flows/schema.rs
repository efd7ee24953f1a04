//! Output schema builders.
//!
//! Schemas use the OpenAPI subset Gemini accepts as `responseSchema`
//! (upper-case type names, `enum`, `required`, numeric and item bounds).

use serde_json::{json, Map, Value};

pub fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

pub fn string_enum(values: &[&str], description: &str) -> Value {
    json!({ "type": "STRING", "enum": values, "description": description })
}

pub fn bounded_number(min: f64, max: f64, description: &str) -> Value {
    json!({
        "type": "NUMBER",
        "minimum": min,
        "maximum": max,
        "description": description,
    })
}

pub fn array(items: Value, min_items: Option<u32>, max_items: Option<u32>, description: &str) -> Value {
    let mut schema = json!({ "type": "ARRAY", "items": items, "description": description });
    if let Some(min) = min_items {
        schema["minItems"] = json!(min);
    }
    if let Some(max) = max_items {
        schema["maxItems"] = json!(max);
    }
    schema
}

/// Object with properties in declaration order. Names in `required` must
/// be declared properties.
pub fn object(properties: Vec<(&str, Value)>, required: &[&str], description: &str) -> Value {
    let ordering: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();

    let mut schema = json!({
        "type": "OBJECT",
        "properties": properties,
        "propertyOrdering": ordering,
        "description": description,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

/// Carbs/protein/fats percentages.
pub fn macro_breakdown() -> Value {
    object(
        vec![
            ("carbs", bounded_number(0.0, 100.0, "Carbohydrates, percent")),
            ("protein", bounded_number(0.0, 100.0, "Protein, percent")),
            ("fats", bounded_number(0.0, 100.0, "Fats, percent")),
        ],
        &["carbs", "protein", "fats"],
        "Conceptual macronutrient split in percent, summing to 100. General guidance only.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keeps_property_order_and_required_list() {
        let schema = object(
            vec![("b", string("second")), ("a", string("first"))],
            &["a"],
            "probe",
        );
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["propertyOrdering"], json!(["b", "a"]));
        assert_eq!(schema["required"], json!(["a"]));
        assert_eq!(schema["properties"]["a"]["type"], "STRING");
    }

    #[test]
    fn optional_bounds_are_omitted() {
        let schema = array(string("x"), None, Some(3), "list");
        assert!(schema.get("minItems").is_none());
        assert_eq!(schema["maxItems"], 3);
    }

    #[test]
    fn macro_breakdown_bounds_each_part() {
        let schema = macro_breakdown();
        for part in ["carbs", "protein", "fats"] {
            assert_eq!(schema["properties"][part]["minimum"], 0.0);
            assert_eq!(schema["properties"][part]["maximum"], 100.0);
        }
    }
}
