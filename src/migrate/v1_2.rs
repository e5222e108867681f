//! Upgrade step: 1.2 -> 1.3
//!
//! The 1.2 format stored each record's grid as a bare array of numbers:
//! `0..=9` for a filled slot, `-1` or `null` for an empty one. There were
//! no color tags and no decoy digits, so every stored digit was part of the
//! secret. This step lifts each number into a cell object of the 1.3 shape,
//! assigning color tags round-robin the way the app does for new records.

use serde_json::{json, Value};

use crate::error::{VaultError, VaultResult};
use crate::models::{ColorTag, GRID_SIZE};

use super::{id_from_value, push_warning};

/// Lift a 1.2 payload (array of grid-of-numbers records) to the 1.3 shape
pub(super) fn upgrade(payload: Value, warnings: &mut Vec<String>) -> VaultResult<Value> {
    let entries = match payload.as_array() {
        Some(entries) => entries.clone(),
        None => return Err(VaultError::InvalidBackupOrPassword),
    };

    let mut upgraded = Vec::with_capacity(entries.len());

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

        let grid = match obj.get("grid").and_then(Value::as_array) {
            Some(grid) => grid.clone(),
            None => {
                push_warning(
                    warnings,
                    format!("skipped record \"{}\": grid is not an array", id),
                );
                continue;
            }
        };

        if grid.len() != GRID_SIZE {
            push_warning(
                warnings,
                format!(
                    "record \"{}\": grid has {} slots, expected {}",
                    id,
                    grid.len(),
                    GRID_SIZE
                ),
            );
        }

        let cells: Vec<Value> = (0..GRID_SIZE)
            .map(|index| cell_from_slot(grid.get(index), index))
            .collect();

        let mut record = json!({
            "id": id,
            "name": obj.get("name").cloned().unwrap_or(Value::Null),
            "cells": cells,
        });

        // 1.2 records may predate timestamps; carry them only when present
        for field in ["created_at", "updated_at"] {
            if let Some(value) = obj.get(field) {
                record[field] = value.clone();
            }
        }

        upgraded.push(record);
    }

    Ok(Value::Array(upgraded))
}

/// Turn one numeric grid slot into a 1.3 cell object
///
/// A digit in a 1.2 grid was always the protected payload, so it migrates
/// with the secret mark set.
fn cell_from_slot(slot: Option<&Value>, index: usize) -> Value {
    let color = ColorTag::from_index(index).to_string();

    let digit = slot
        .and_then(Value::as_i64)
        .filter(|d| (0..=9).contains(d));

    match digit {
        Some(digit) => json!({
            "index": index,
            "color": color,
            "digit": digit,
            "secret": true,
        }),
        None => json!({
            "index": index,
            "color": color,
            "digit": null,
            "secret": false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_become_secret_cells() {
        let mut grid = vec![json!(-1); GRID_SIZE];
        grid[3] = json!(7);

        let payload = json!([{"id": "1", "name": "A", "grid": grid}]);
        let mut warnings = Vec::new();
        let upgraded = upgrade(payload, &mut warnings).unwrap();

        let cells = upgraded[0]["cells"].as_array().unwrap();
        assert_eq!(cells.len(), GRID_SIZE);
        assert_eq!(cells[3]["digit"], json!(7));
        assert_eq!(cells[3]["secret"], json!(true));
        assert_eq!(cells[0]["digit"], Value::Null);
        assert_eq!(cells[0]["secret"], json!(false));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_colors_assigned_round_robin() {
        let grid = vec![json!(null); GRID_SIZE];
        let payload = json!([{"id": "1", "name": "A", "grid": grid}]);
        let upgraded = upgrade(payload, &mut Vec::new()).unwrap();

        let cells = upgraded[0]["cells"].as_array().unwrap();
        assert_eq!(cells[0]["color"], json!("blue"));
        assert_eq!(cells[1]["color"], json!("green"));
        assert_eq!(cells[4]["color"], json!("blue"));
    }

    #[test]
    fn test_non_array_grid_skips_record() {
        let payload = json!([
            {"id": "bad", "name": "B", "grid": "oops"},
            {"id": "good", "name": "G", "grid": vec![json!(null); GRID_SIZE]},
        ]);
        let mut warnings = Vec::new();
        let upgraded = upgrade(payload, &mut warnings).unwrap();

        assert_eq!(upgraded.as_array().unwrap().len(), 1);
        assert_eq!(upgraded[0]["id"], json!("good"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("bad"));
    }

    #[test]
    fn test_out_of_range_slot_becomes_empty() {
        let mut grid = vec![json!(null); GRID_SIZE];
        grid[0] = json!(12);
        grid[1] = json!("x");

        let payload = json!([{"id": "1", "name": "A", "grid": grid}]);
        let upgraded = upgrade(payload, &mut Vec::new()).unwrap();

        let cells = upgraded[0]["cells"].as_array().unwrap();
        assert_eq!(cells[0]["digit"], Value::Null);
        assert_eq!(cells[1]["digit"], Value::Null);
    }

    #[test]
    fn test_top_level_must_be_array() {
        let result = upgrade(json!({"records": []}), &mut Vec::new());
        assert!(matches!(result, Err(VaultError::InvalidBackupOrPassword)));
    }
}
