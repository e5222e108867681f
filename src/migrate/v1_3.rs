//! Upgrade step: 1.3 -> 1.4
//!
//! The 1.3 format listed records as a flat array; 1.4 keys the set by
//! record id. This step re-keys the array, normalizing ids to strings and
//! keeping the last occurrence when a backup carries the same id twice.

use serde_json::{Map, Value};

use crate::error::{VaultError, VaultResult};

use super::{id_from_value, push_warning};

/// Re-key a 1.3 payload (record array) into the 1.4 id-keyed map shape
pub(super) fn upgrade(payload: Value, warnings: &mut Vec<String>) -> VaultResult<Value> {
    let entries = match payload.as_array() {
        Some(entries) => entries.clone(),
        None => return Err(VaultError::InvalidBackupOrPassword),
    };

    let mut by_id = Map::with_capacity(entries.len());

    for (position, entry) in entries.iter().enumerate() {
        let obj = match entry.as_object() {
            Some(obj) => obj,
            None => {
                push_warning(
                    warnings,
                    format!("skipped record at position {}: not an object", position),
                );
                continue;
            }
        };

        let id = match obj.get("id").and_then(id_from_value) {
            Some(id) => id,
            None => {
                push_warning(
                    warnings,
                    format!("skipped record at position {}: missing id", position),
                );
                continue;
            }
        };

        let mut record = Value::Object(obj.clone());
        record["id"] = Value::String(id.clone());

        if by_id.insert(id.clone(), record).is_some() {
            push_warning(
                warnings,
                format!("record \"{}\" appears more than once, keeping the last copy", id),
            );
        }
    }

    let mut wrapper = Map::new();
    wrapper.insert("records".to_string(), Value::Object(by_id));
    Ok(Value::Object(wrapper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_is_rekeyed_by_id() {
        let payload = json!([
            {"id": "a", "name": "First", "cells": []},
            {"id": "b", "name": "Second", "cells": []},
        ]);
        let mut warnings = Vec::new();
        let upgraded = upgrade(payload, &mut warnings).unwrap();

        let records = upgraded["records"].as_object().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records["a"]["name"], json!("First"));
        assert_eq!(records["b"]["name"], json!("Second"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_numeric_id_normalized_to_string() {
        let payload = json!([{"id": 7, "name": "N", "cells": []}]);
        let upgraded = upgrade(payload, &mut Vec::new()).unwrap();

        let records = upgraded["records"].as_object().unwrap();
        assert_eq!(records["7"]["id"], json!("7"));
    }

    #[test]
    fn test_duplicate_id_keeps_last_with_warning() {
        let payload = json!([
            {"id": "a", "name": "Old", "cells": []},
            {"id": "a", "name": "New", "cells": []},
        ]);
        let mut warnings = Vec::new();
        let upgraded = upgrade(payload, &mut warnings).unwrap();

        let records = upgraded["records"].as_object().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records["a"]["name"], json!("New"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_id_skipped_with_warning() {
        let payload = json!([{"name": "No id", "cells": []}]);
        let mut warnings = Vec::new();
        let upgraded = upgrade(payload, &mut warnings).unwrap();

        assert!(upgraded["records"].as_object().unwrap().is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_top_level_must_be_array() {
        let result = upgrade(json!({}), &mut Vec::new());
        assert!(matches!(result, Err(VaultError::InvalidBackupOrPassword)));
    }
}
