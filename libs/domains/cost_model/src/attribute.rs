use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Open-ended resource attribute value.
///
/// Resource attributes are modeled as a tagged variant rather than
/// free-form typed structs, so adapters and the pricing matcher can walk
/// attributes of planned-change documents and provider catalogs without
/// knowing their shape ahead of time. `Map` uses a `BTreeMap` so
/// serialization order (and therefore hashing) is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            AttributeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Case-folded, trimmed equality used by the pricing matcher and the
    /// describe-API adapters when comparing catalog/provider strings.
    pub fn loosely_eq_str(&self, other: &str) -> bool {
        match self.as_str() {
            Some(s) => s.trim().eq_ignore_ascii_case(other.trim()),
            None => false,
        }
    }

    /// Render a scalar as a display string for matching/logging; returns
    /// `None` for `List`/`Map` which have no single-string representation.
    pub fn display_scalar(&self) -> Option<String> {
        match self {
            AttributeValue::Null => None,
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::Number(n) => Some(n.to_string()),
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::List(_) | AttributeValue::Map(_) => None,
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(b),
            serde_json::Value::Number(n) => AttributeValue::Number(n),
            serde_json::Value::String(s) => AttributeValue::String(s),
            serde_json::Value::Array(items) => {
                AttributeValue::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => AttributeValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, AttributeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

/// Ordered attribute map: insertion order does not matter for equality or
/// hashing (it's a `BTreeMap`), which is what makes attribute-derived cache
/// keys and resource-id derivation stable across runs.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loosely_eq_str_ignores_case_and_whitespace() {
        let value = AttributeValue::String("  Us-East-1  ".to_string());
        assert!(value.loosely_eq_str("us-east-1"));
    }

    #[test]
    fn from_json_round_trips_nested_structures() {
        let json = serde_json::json!({"a": [1, "b", {"c": true}]});
        let attr = AttributeValue::from(json);
        let map = attr.as_map().expect("map");
        let list = map.get("a").and_then(AttributeValue::as_list).expect("list");
        assert_eq!(list.len(), 3);
    }
}
