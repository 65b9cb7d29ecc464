//! State bridge between host values and typed records
//!
//! Records are plain serde types. Computed attributes are `Option`s so that a
//! plan (where they are still unknown) decodes as `None`, while empty
//! collections stay `Some(empty)` in both directions.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BridgeError, Result};
use crate::schema::Schema;
use crate::value::Value;

/// Decode a fully-known value (prior state, refreshed state)
pub fn decode_state<T: DeserializeOwned>(value: &Value) -> Result<T> {
    if let Some(path) = value.find_unknown() {
        return Err(BridgeError::UnknownValue { path });
    }
    decode_plan(value)
}

/// Decode a planned value; unknown attributes decode as null
pub fn decode_plan<T: DeserializeOwned>(value: &Value) -> Result<T> {
    serde_json::from_value(value.to_json()).map_err(|e| BridgeError::Decode {
        message: e.to_string(),
    })
}

/// Encode a record into a value shaped by the schema
pub fn encode<T: Serialize>(record: &T, schema: &Schema) -> Result<Value> {
    let json = serde_json::to_value(record).map_err(|e| BridgeError::Encode {
        message: e.to_string(),
    })?;
    Value::from_json(&json, &schema.object_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrType, Attribute};
    use serde::Deserialize;
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        #[serde(default)]
        project_key: Option<String>,
        #[serde(default)]
        repositories: Option<BTreeSet<String>>,
        #[serde(default)]
        used_in: Option<Vec<String>>,
    }

    fn schema() -> Schema {
        Schema::new()
            .with_attribute("name", Attribute::required(AttrType::String))
            .with_attribute("project_key", Attribute::optional(AttrType::String))
            .with_attribute("repositories", Attribute::computed(AttrType::set(AttrType::String)))
            .with_attribute("used_in", Attribute::computed(AttrType::list(AttrType::String)))
    }

    #[test]
    fn test_empty_collections_survive() {
        let record = Record {
            name: "qa".to_string(),
            project_key: None,
            repositories: Some(BTreeSet::new()),
            used_in: Some(vec![]),
        };

        let value = encode(&record, &schema()).unwrap();
        assert_eq!(value.get("repositories"), &Value::Set(vec![]));
        assert_eq!(value.get("used_in"), &Value::List(vec![]));
        assert!(value.get("project_key").is_null());

        let back: Record = decode_state(&value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_plan_unknowns_decode_as_none() {
        let mut value = encode(
            &Record {
                name: "qa".to_string(),
                project_key: None,
                repositories: None,
                used_in: None,
            },
            &schema(),
        )
        .unwrap();
        *value.get_mut("repositories").unwrap() = Value::Unknown;

        let plan: Record = decode_plan(&value).unwrap();
        assert_eq!(plan.repositories, None);

        let err = decode_state::<Record>(&value).unwrap_err();
        assert_eq!(err.to_string(), "value at repositories is not yet known");
    }
}
