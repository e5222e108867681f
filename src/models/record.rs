//! Record model
//!
//! A record is a user-named grid of 40 cells. Records are owned by the
//! record store; the backup core only ever works with copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cell::{Cell, ColorTag};
use super::ids::RecordId;

/// Number of cells in every record's grid
pub const GRID_SIZE: usize = 40;

/// Maximum length of a record name in characters
pub const MAX_NAME_LEN: usize = 50;

/// A named grid of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, assigned at creation, immutable
    pub id: RecordId,

    /// User-chosen name (1-50 characters)
    pub name: String,

    /// The grid, always exactly [`GRID_SIZE`] cells in position order
    pub cells: Vec<Cell>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified; never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record with an empty grid
    ///
    /// Color tags are assigned round-robin so the four tags are spread
    /// roughly evenly across the grid.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        let cells = (0..GRID_SIZE)
            .map(|i| Cell::empty(i as u8, ColorTag::from_index(i)))
            .collect();

        Self {
            id: RecordId::new(),
            name: name.into(),
            cells,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Digits currently marked as secret, in grid order
    pub fn secret_digits(&self) -> Vec<u8> {
        self.cells
            .iter()
            .filter(|c| c.secret)
            .filter_map(|c| c.digit)
            .collect()
    }

    /// Validate all record invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("record id must not be empty".to_string());
        }

        let name_len = self.name.chars().count();
        if name_len == 0 {
            return Err("record name must not be empty".to_string());
        }
        if name_len > MAX_NAME_LEN {
            return Err(format!(
                "record name is {} characters, maximum is {}",
                name_len, MAX_NAME_LEN
            ));
        }

        if self.cells.len() != GRID_SIZE {
            return Err(format!(
                "record has {} cells, expected {}",
                self.cells.len(),
                GRID_SIZE
            ));
        }

        for (position, cell) in self.cells.iter().enumerate() {
            if cell.index as usize != position {
                return Err(format!(
                    "cell at position {} carries index {}",
                    position, cell.index
                ));
            }
            cell.validate()?;
        }

        if self.updated_at < self.created_at {
            return Err("record was updated before it was created".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_valid() {
        let record = Record::new("Bank PIN");
        record.validate().unwrap();
        assert_eq!(record.cells.len(), GRID_SIZE);
        assert_eq!(record.updated_at, record.created_at);
    }

    #[test]
    fn test_new_record_colors_evenly_distributed() {
        let record = Record::new("Grid");
        for tag in ColorTag::ALL {
            let count = record.cells.iter().filter(|c| c.color == tag).count();
            assert_eq!(count, GRID_SIZE / ColorTag::ALL.len());
        }
    }

    #[test]
    fn test_touch_moves_updated_at_forward() {
        let mut record = Record::new("Grid");
        let created = record.created_at;
        record.touch();
        assert!(record.updated_at >= created);
        record.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut record = Record::new("Grid");
        record.name = String::new();
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let record = Record::new("x".repeat(MAX_NAME_LEN + 1));
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_grid() {
        let mut record = Record::new("Grid");
        record.cells.pop();
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_misindexed_cell() {
        let mut record = Record::new("Grid");
        record.cells[3].index = 7;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_secret_digits_in_grid_order() {
        let mut record = Record::new("Grid");
        record.cells[10].set_digit(Some(4));
        record.cells[10].set_secret(true);
        record.cells[2].set_digit(Some(9));
        record.cells[2].set_secret(true);
        record.cells[5].set_digit(Some(1)); // decoy, not secret

        assert_eq!(record.secret_digits(), vec![9, 4]);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut record = Record::new("Grid");
        record.cells[0].set_digit(Some(5));
        record.cells[0].set_secret(true);

        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
