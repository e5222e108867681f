//! Legacy backup migration
//!
//! Upgrades decrypted payloads written by older backup formats to the
//! current record schema. The chain is strictly version-ordered and each
//! step lifts exactly one generation:
//!
//! ```text
//! 1.2 (array-of-numbers grids)
//!   -> 1.3 (array-of-cell-objects)
//!   -> 1.4 (record map keyed by id)
//!   -> 1.5 (current list payload)
//! ```
//!
//! Migration is tolerant at the record level: a record that cannot be
//! salvaged is skipped with a warning instead of failing the whole restore.
//! Only when the payload held candidate records and none survived does the
//! migration fail, with [`VaultError::NoRecoverableRecords`]. A genuinely
//! empty payload migrates to an empty set.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::FormatVersion;
use crate::error::{VaultError, VaultResult};
use crate::models::{Cell, ColorTag, Record, RecordId, GRID_SIZE, MAX_NAME_LEN};

mod v1_2;
mod v1_3;
mod v1_4;

/// Upgrade a decrypted legacy payload to the current record schema
///
/// `declared` is the version from the envelope header. Versions outside the
/// known chain fail immediately with [`VaultError::UnsupportedVersion`];
/// no best-effort migration is attempted.
pub fn migrate(
    payload: Value,
    declared: &FormatVersion,
) -> VaultResult<(Vec<Record>, Vec<String>)> {
    let mut warnings = Vec::new();
    let mut payload = payload;
    let mut version = declared.clone();

    let candidates = count_candidates(&payload, declared);

    loop {
        version = match version {
            FormatVersion::V1_2 => {
                payload = v1_2::upgrade(payload, &mut warnings)?;
                FormatVersion::V1_3
            }
            FormatVersion::V1_3 => {
                payload = v1_3::upgrade(payload, &mut warnings)?;
                FormatVersion::V1_4
            }
            FormatVersion::V1_4 => {
                payload = v1_4::upgrade(payload, &mut warnings)?;
                FormatVersion::V1_5
            }
            FormatVersion::V1_5 => break,
            FormatVersion::Unsupported(v) => return Err(VaultError::UnsupportedVersion(v)),
        };
    }

    let records = lift_current(payload, &mut warnings)?;

    if records.is_empty() && candidates > 0 {
        return Err(VaultError::NoRecoverableRecords);
    }

    debug!(
        "migrated {} of {} records from format {} ({} warnings)",
        records.len(),
        candidates,
        declared,
        warnings.len()
    );

    Ok((records, warnings))
}

/// How many record candidates the raw payload holds, per its declared shape
fn count_candidates(payload: &Value, declared: &FormatVersion) -> usize {
    match declared {
        FormatVersion::V1_2 | FormatVersion::V1_3 => {
            payload.as_array().map_or(0, |records| records.len())
        }
        FormatVersion::V1_4 => payload
            .get("records")
            .and_then(Value::as_object)
            .map_or(0, |records| records.len()),
        FormatVersion::V1_5 => payload
            .get("records")
            .and_then(Value::as_array)
            .map_or(0, |records| records.len()),
        FormatVersion::Unsupported(_) => 0,
    }
}

/// Record a migration warning
pub(crate) fn push_warning(warnings: &mut Vec<String>, message: String) {
    warn!("migration: {}", message);
    warnings.push(message);
}

/// Read a record id that legacy formats stored as either a string or a number
pub(crate) fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Lift a current-shape payload (`{"records": [...]}`) into typed records
///
/// Tolerant per record: unusable entries are skipped with a warning,
/// recoverable defects (oversized grid, overlong name) are normalized with
/// a warning.
fn lift_current(payload: Value, warnings: &mut Vec<String>) -> VaultResult<Vec<Record>> {
    let entries = match payload.get("records").and_then(Value::as_array) {
        Some(entries) => entries.clone(),
        None => return Err(VaultError::InvalidBackupOrPassword),
    };

    let mut records = Vec::with_capacity(entries.len());

    for (position, entry) in entries.iter().enumerate() {
        match lift_record(entry, position, warnings) {
            Some(record) => records.push(record),
            None => continue,
        }
    }

    Ok(records)
}

/// Lift a single record value, or skip it with a warning
fn lift_record(entry: &Value, position: usize, warnings: &mut Vec<String>) -> Option<Record> {
    let obj = match entry.as_object() {
        Some(obj) => obj,
        None => {
            push_warning(
                warnings,
                format!("skipped record at position {}: not an object", position),
            );
            return None;
        }
    };

    let id = match obj.get("id").and_then(id_from_value) {
        Some(id) => id,
        None => {
            push_warning(
                warnings,
                format!("skipped record at position {}: missing id", position),
            );
            return None;
        }
    };

    let mut name = match obj.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            push_warning(warnings, format!("skipped record \"{}\": missing name", id));
            return None;
        }
    };

    if name.chars().count() > MAX_NAME_LEN {
        name = name.chars().take(MAX_NAME_LEN).collect();
        push_warning(
            warnings,
            format!("record \"{}\": name truncated to {} characters", id, MAX_NAME_LEN),
        );
    }

    let raw_cells = match obj.get("cells").and_then(Value::as_array) {
        Some(cells) => cells.clone(),
        None => {
            push_warning(
                warnings,
                format!("record \"{}\": missing cells, restored as an empty grid", id),
            );
            Vec::new()
        }
    };

    if raw_cells.len() > GRID_SIZE {
        push_warning(
            warnings,
            format!(
                "record \"{}\": grid trimmed from {} to {} cells",
                id,
                raw_cells.len(),
                GRID_SIZE
            ),
        );
    } else if !raw_cells.is_empty() && raw_cells.len() < GRID_SIZE {
        push_warning(
            warnings,
            format!(
                "record \"{}\": grid padded from {} to {} cells",
                id,
                raw_cells.len(),
                GRID_SIZE
            ),
        );
    }

    let cells = (0..GRID_SIZE)
        .map(|index| lift_cell(raw_cells.get(index), index))
        .collect();

    let now = Utc::now();
    let created_at = timestamp_from(obj.get("created_at")).unwrap_or(now);
    let mut updated_at = timestamp_from(obj.get("updated_at")).unwrap_or(created_at);
    if updated_at < created_at {
        updated_at = created_at;
    }

    let record = Record {
        id: RecordId::from_raw(id.clone()),
        name,
        cells,
        created_at,
        updated_at,
    };

    match record.validate() {
        Ok(()) => Some(record),
        Err(reason) => {
            push_warning(warnings, format!("skipped record \"{}\": {}", id, reason));
            None
        }
    }
}

/// Lift a single cell value into the typed model, defaulting anything unusable
fn lift_cell(raw: Option<&Value>, index: usize) -> Cell {
    let obj = match raw.and_then(Value::as_object) {
        Some(obj) => obj,
        None => return Cell::empty(index as u8, ColorTag::from_index(index)),
    };

    let color = obj
        .get("color")
        .and_then(Value::as_str)
        .and_then(ColorTag::parse)
        .unwrap_or_else(|| ColorTag::from_index(index));

    let digit = obj
        .get("digit")
        .and_then(Value::as_u64)
        .filter(|d| *d <= 9)
        .map(|d| d as u8);

    let secret = obj.get("secret").and_then(Value::as_bool).unwrap_or(false);

    Cell {
        index: index as u8,
        color,
        digit,
        secret: secret && digit.is_some(),
    }
}

/// Parse a timestamp a legacy backup stored as an RFC 3339 string
fn timestamp_from(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_future_version_rejected_before_any_step() {
        let payload = json!([{"id": "1", "name": "A", "grid": []}]);
        let result = migrate(payload, &FormatVersion::Unsupported("2.0".to_string()));
        assert!(matches!(result, Err(VaultError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_empty_payload_migrates_to_empty_set() {
        let (records, warnings) = migrate(json!([]), &FormatVersion::V1_2).unwrap();
        assert!(records.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_one_good_one_malformed_yields_one_record_one_warning() {
        // 1.4 map with a well-formed record and a record missing its name
        let good_cells: Vec<Value> = (0..GRID_SIZE)
            .map(|i| json!({"index": i, "color": "blue", "digit": null, "secret": false}))
            .collect();
        let payload = json!({
            "records": {
                "good": {"id": "good", "name": "Kept", "cells": good_cells},
                "bad": {"id": "bad"}
            }
        });

        let (records, warnings) = migrate(payload, &FormatVersion::V1_4).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "good");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("bad"));
    }

    #[test]
    fn test_zero_survivors_from_candidates_is_an_error() {
        let payload = json!({"records": {"a": {"id": "a"}, "b": 42}});
        let result = migrate(payload, &FormatVersion::V1_4);
        assert!(matches!(result, Err(VaultError::NoRecoverableRecords)));
    }

    #[test]
    fn test_full_chain_from_1_2() {
        // A 1.2 grid: digits and empty slots as a bare number array
        let mut grid = vec![json!(-1); GRID_SIZE];
        grid[0] = json!(4);
        grid[7] = json!(9);
        let payload = json!([
            {"id": "1", "name": "Old PIN", "grid": grid,
             "created_at": "2021-03-01T10:00:00Z", "updated_at": "2021-04-01T10:00:00Z"}
        ]);

        let (records, warnings) = migrate(payload, &FormatVersion::V1_2).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id.as_str(), "1");
        assert_eq!(record.name, "Old PIN");
        assert_eq!(record.cells.len(), GRID_SIZE);
        assert_eq!(record.cells[0].digit, Some(4));
        assert!(record.cells[0].secret);
        assert_eq!(record.cells[7].digit, Some(9));
        assert!(record.cells[1].digit.is_none());
        record.validate().unwrap();
    }

    #[test]
    fn test_grid_size_mismatch_is_normalized_with_warning() {
        let cells: Vec<Value> = (0..10)
            .map(|i| json!({"index": i, "color": "green", "digit": 5, "secret": true}))
            .collect();
        let payload = json!([{"id": "r", "name": "Short", "cells": cells}]);

        let (records, warnings) = migrate(payload, &FormatVersion::V1_3).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cells.len(), GRID_SIZE);
        assert_eq!(records[0].cells[9].digit, Some(5));
        assert!(records[0].cells[10].digit.is_none());
        assert!(warnings.iter().any(|w| w.contains("padded")));
    }

    #[test]
    fn test_numeric_ids_are_accepted() {
        let payload = json!({"records": {"3": {"id": 3, "name": "Numbered", "cells": []}}});
        let (records, _) = migrate(payload, &FormatVersion::V1_4).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "3");
    }

    #[test]
    fn test_missing_cells_restores_empty_grid_with_warning() {
        let payload = json!({"records": {"r": {"id": "r", "name": "Bare"}}});
        let (records, warnings) = migrate(payload, &FormatVersion::V1_4).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].cells.iter().all(|c| c.is_empty()));
        assert!(warnings.iter().any(|w| w.contains("empty grid")));
    }

    #[test]
    fn test_overlong_name_is_truncated() {
        let payload = json!([{"id": "r", "name": "x".repeat(MAX_NAME_LEN + 20), "cells": []}]);
        let (records, warnings) = migrate(payload, &FormatVersion::V1_3).unwrap();
        assert_eq!(records[0].name.chars().count(), MAX_NAME_LEN);
        assert!(warnings.iter().any(|w| w.contains("truncated")));
    }

    #[test]
    fn test_wrong_toplevel_shape_is_indistinguishable_failure() {
        let result = migrate(json!({"unexpected": true}), &FormatVersion::V1_2);
        assert!(matches!(result, Err(VaultError::InvalidBackupOrPassword)));
    }

    #[test]
    fn test_secret_flag_dropped_when_digit_missing() {
        let mut cells: Vec<Value> = (0..GRID_SIZE)
            .map(|i| json!({"index": i, "color": "rose", "digit": null, "secret": false}))
            .collect();
        cells[5] = json!({"index": 5, "color": "rose", "digit": null, "secret": true});

        let payload = json!([{"id": "r", "name": "Odd", "cells": cells}]);
        let (records, _) = migrate(payload, &FormatVersion::V1_3).unwrap();
        assert!(!records[0].cells[5].secret);
        records[0].validate().unwrap();
    }
}
