//! Host value tree
//!
//! The host engine describes configuration, plans and state as a typed tree
//! that distinguishes null (absent) from unknown (computed later). Lists keep
//! their order; sets are deduplicated and compare without regard to order.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::error::{BridgeError, Result};
use crate::path::AttributePath;
use crate::schema::AttrType;

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Unknown,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Ordered list of strings
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    /// Build a set, dropping duplicate elements
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// True when neither this value nor any nested value is unknown
    pub fn is_fully_known(&self) -> bool {
        match self {
            Value::Unknown => false,
            Value::List(items) | Value::Set(items) => items.iter().all(Value::is_fully_known),
            Value::Map(entries) => entries.values().all(Value::is_fully_known),
            Value::Object(fields) => fields.values().all(Value::is_fully_known),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or set
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Field of an object, `Null` when absent
    pub fn get(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        match self {
            Value::Object(fields) => fields.get(name).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Object(fields) => fields.get_mut(name),
            _ => None,
        }
    }

    /// Short type name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unknown => "unknown",
            Value::Bool(_) => "bool",
            Value::Int(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    /// Decode JSON against the expected type
    ///
    /// Object fields missing from the JSON become `Null`; fields the type
    /// does not declare are dropped.
    pub fn from_json(json: &JsonValue, ty: &AttrType) -> Result<Self> {
        decode(json, ty, &AttributePath::root())
    }

    /// Encode to JSON; unknown values become `null`
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null | Value::Unknown => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::List(items) | Value::Set(items) => {
                JsonValue::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Object(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// First unknown location, if any
    pub fn find_unknown(&self) -> Option<AttributePath> {
        find_unknown(self, &AttributePath::root())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Unknown, Value::Unknown) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            _ => false,
        }
    }
}

fn mismatch(path: &AttributePath, expected: &AttrType, json: &JsonValue) -> BridgeError {
    let found = match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    };
    BridgeError::TypeMismatch {
        path: path.clone(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn decode(json: &JsonValue, ty: &AttrType, path: &AttributePath) -> Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    match ty {
        AttrType::String => json
            .as_str()
            .map(Value::string)
            .ok_or_else(|| mismatch(path, ty, json)),
        AttrType::Int64 => json
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| mismatch(path, ty, json)),
        AttrType::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch(path, ty, json)),
        AttrType::List(elem) | AttrType::Set(elem) => {
            let items = json.as_array().ok_or_else(|| mismatch(path, ty, json))?;
            let decoded = items
                .iter()
                .enumerate()
                .map(|(i, item)| decode(item, elem, &path.index(i)))
                .collect::<Result<Vec<_>>>()?;
            Ok(match ty {
                AttrType::Set(_) => Value::set(decoded),
                _ => Value::List(decoded),
            })
        }
        AttrType::Map(elem) => {
            let entries = json.as_object().ok_or_else(|| mismatch(path, ty, json))?;
            let decoded = entries
                .iter()
                .map(|(k, v)| -> Result<(String, Value)> {
                    Ok((k.clone(), decode(v, elem, &path.key(k.clone()))?))
                })
                .collect::<Result<BTreeMap<_, _>>>()?;
            Ok(Value::Map(decoded))
        }
        AttrType::Object(fields) => {
            let entries = json.as_object().ok_or_else(|| mismatch(path, ty, json))?;
            let decoded = fields
                .iter()
                .map(|(name, field_ty)| -> Result<(String, Value)> {
                    let value = match entries.get(name) {
                        Some(v) => decode(v, field_ty, &path.child(name.clone()))?,
                        None => Value::Null,
                    };
                    Ok((name.clone(), value))
                })
                .collect::<Result<IndexMap<_, _>>>()?;
            Ok(Value::Object(decoded))
        }
    }
}

fn find_unknown(value: &Value, path: &AttributePath) -> Option<AttributePath> {
    match value {
        Value::Unknown => Some(path.clone()),
        Value::List(items) | Value::Set(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| find_unknown(item, &path.index(i))),
        Value::Map(entries) => entries
            .iter()
            .find_map(|(k, v)| find_unknown(v, &path.key(k.clone()))),
        Value::Object(fields) => fields
            .iter()
            .find_map(|(k, v)| find_unknown(v, &path.child(k.clone()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stage_type() -> AttrType {
        AttrType::object([
            ("name", AttrType::String),
            ("repositories", AttrType::set(AttrType::String)),
            ("used_in_lifecycles", AttrType::list(AttrType::String)),
            ("created", AttrType::Int64),
        ])
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a = Value::set([Value::string("a"), Value::string("b")]);
        let b = Value::set([Value::string("b"), Value::string("a")]);
        assert_eq!(a, b);

        let list_a = Value::string_list(["a", "b"]);
        let list_b = Value::string_list(["b", "a"]);
        assert_ne!(list_a, list_b);
    }

    #[test]
    fn test_set_deduplicates() {
        let set = Value::set([Value::string("a"), Value::string("a")]);
        assert_eq!(set.as_elements().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn test_from_json_keeps_empty_collections() {
        let value = Value::from_json(
            &json!({"name": "qa", "repositories": [], "used_in_lifecycles": [], "created": 17}),
            &stage_type(),
        )
        .unwrap();

        assert_eq!(value.get("repositories"), &Value::Set(vec![]));
        assert_eq!(value.get("used_in_lifecycles"), &Value::List(vec![]));
        assert_eq!(value.get("created"), &Value::Int(17));
        assert_eq!(
            value.to_json(),
            json!({"name": "qa", "repositories": [], "used_in_lifecycles": [], "created": 17})
        );
    }

    #[test]
    fn test_from_json_missing_fields_are_null() {
        let value = Value::from_json(&json!({"name": "qa", "extra": true}), &stage_type()).unwrap();
        assert!(value.get("repositories").is_null());
        assert!(value.get("extra").is_null());
    }

    #[test]
    fn test_type_mismatch_reports_path() {
        let err = Value::from_json(
            &json!({"name": "qa", "used_in_lifecycles": ["ok", 3]}),
            &stage_type(),
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "type mismatch at used_in_lifecycles[1]: expected string, found number"
        );
    }

    #[test]
    fn test_find_unknown() {
        let mut fields = IndexMap::new();
        fields.insert("name".to_string(), Value::string("qa"));
        fields.insert("scope".to_string(), Value::Unknown);
        let value = Value::Object(fields);

        assert!(!value.is_fully_known());
        assert_eq!(value.find_unknown().unwrap().to_string(), "scope");
        assert!(value.to_json()["scope"].is_null());
    }
}
