//! Tolerant deserializers for model-produced JSON.
//!
//! Models drift from the requested schema: numbers where strings were asked
//! for, a comma-joined string instead of an array, `null` for "absent".
//! These helpers accept those shapes so one stray field does not make the
//! whole reply unparseable.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Scalar rendered as text. `null`, arrays and objects become `None`.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `Option<String>` from a string, number, bool or null.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_to_string))
}

/// `Option<f64>` from a number or a numeric string such as `"45"` or `"45%"`.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    })
}

/// A list field that may arrive as an array or as one joined string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringOrList {
    Joined(String),
    List(Vec<String>),
}

/// `Option<StringOrList>`. Non-string array items are rendered as text;
/// anything else is treated as absent.
pub fn opt_string_or_list<'de, D>(deserializer: D) -> Result<Option<StringOrList>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(StringOrList::Joined(s)),
        Some(Value::Array(items)) => Some(StringOrList::List(
            items.into_iter().filter_map(scalar_to_string).collect(),
        )),
        _ => None,
    })
}

/// `Option<Vec<T>>` where unparseable items are skipped rather than failing
/// the whole list.
pub fn opt_vec_skip_invalid<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// `Option<T>` where a value of the wrong shape is treated as absent.
pub fn opt_or_invalid<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
