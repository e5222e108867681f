//! Upgrade step: 1.4 -> 1.5
//!
//! The 1.4 format keyed the record set by id; the current format lists it.
//! This step flattens the map, filling in a record's id from its map key
//! when the object itself lost the field.

use serde_json::{json, Value};

use crate::error::{VaultError, VaultResult};

use super::push_warning;

/// Flatten a 1.4 payload (id-keyed record map) into the current list shape
pub(super) fn upgrade(payload: Value, warnings: &mut Vec<String>) -> VaultResult<Value> {
    let by_id = match payload.get("records").and_then(Value::as_object) {
        Some(by_id) => by_id.clone(),
        None => return Err(VaultError::InvalidBackupOrPassword),
    };

    let mut records = Vec::with_capacity(by_id.len());

    for (key, entry) in by_id {
        let mut record = match entry.as_object() {
            Some(obj) => obj.clone(),
            None => {
                push_warning(
                    warnings,
                    format!("skipped record \"{}\": not an object", key),
                );
                continue;
            }
        };

        record
            .entry("id".to_string())
            .or_insert_with(|| Value::String(key));

        records.push(Value::Object(record));
    }

    Ok(json!({ "records": records }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_is_flattened_to_list() {
        let payload = json!({
            "records": {
                "a": {"id": "a", "name": "First", "cells": []},
                "b": {"id": "b", "name": "Second", "cells": []},
            }
        });
        let mut warnings = Vec::new();
        let upgraded = upgrade(payload, &mut warnings).unwrap();

        let records = upgraded["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_id_filled_from_map_key() {
        let payload = json!({"records": {"k": {"name": "Keyed", "cells": []}}});
        let upgraded = upgrade(payload, &mut Vec::new()).unwrap();

        let records = upgraded["records"].as_array().unwrap();
        assert_eq!(records[0]["id"], json!("k"));
    }

    #[test]
    fn test_non_object_entry_skipped_with_warning() {
        let payload = json!({"records": {"a": {"id": "a", "name": "Kept", "cells": []}, "b": 42}});
        let mut warnings = Vec::new();
        let upgraded = upgrade(payload, &mut warnings).unwrap();

        assert_eq!(upgraded["records"].as_array().unwrap().len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("b"));
    }

    #[test]
    fn test_top_level_must_be_record_map() {
        let result = upgrade(json!([1, 2, 3]), &mut Vec::new());
        assert!(matches!(result, Err(VaultError::InvalidBackupOrPassword)));
    }
}
