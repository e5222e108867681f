//! Grid cell model
//!
//! A record is a fixed grid of 40 cells. Each cell carries a color tag and
//! may hold a single digit; a held digit can be marked as part of the
//! user's secret.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color tag attached to every cell
///
/// Tags are assigned round-robin at record creation so each of the four
/// colors covers roughly a quarter of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    /// Blue cells
    Blue,
    /// Green cells
    Green,
    /// Amber cells
    Amber,
    /// Rose cells
    Rose,
}

impl ColorTag {
    /// All tags in assignment order
    pub const ALL: [ColorTag; 4] = [Self::Blue, Self::Green, Self::Amber, Self::Rose];

    /// Tag for a cell position, cycling through the four colors
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Parse a color tag from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "amber" => Some(Self::Amber),
            "rose" => Some(Self::Rose),
            _ => None,
        }
    }
}

impl Default for ColorTag {
    fn default() -> Self {
        Self::Blue
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blue => write!(f, "blue"),
            Self::Green => write!(f, "green"),
            Self::Amber => write!(f, "amber"),
            Self::Rose => write!(f, "rose"),
        }
    }
}

/// One cell of a record's grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Position in the grid (0..40), derived from the cell's slot and immutable
    pub index: u8,

    /// Color tag for visual grouping
    pub color: ColorTag,

    /// Digit held by this cell (0-9); `None` means the cell is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digit: Option<u8>,

    /// Whether the held digit is part of the user's secret.
    /// Invariant: may only be true while `digit` is set.
    #[serde(default)]
    pub secret: bool,
}

impl Cell {
    /// Create an empty cell
    pub fn empty(index: u8, color: ColorTag) -> Self {
        Self {
            index,
            color,
            digit: None,
            secret: false,
        }
    }

    /// Create a cell holding a digit
    pub fn with_digit(index: u8, color: ColorTag, digit: u8, secret: bool) -> Self {
        Self {
            index,
            color,
            digit: Some(digit),
            secret,
        }
    }

    /// Set or clear the digit; clearing also clears the secret mark
    pub fn set_digit(&mut self, digit: Option<u8>) {
        self.digit = digit;
        if self.digit.is_none() {
            self.secret = false;
        }
    }

    /// Mark or unmark the digit as secret; a cell without a digit
    /// cannot be secret
    pub fn set_secret(&mut self, secret: bool) {
        self.secret = secret && self.digit.is_some();
    }

    /// Whether the cell holds no digit
    pub fn is_empty(&self) -> bool {
        self.digit.is_none()
    }

    /// Validate cell invariants
    pub fn validate(&self) -> Result<(), String> {
        if let Some(digit) = self.digit {
            if digit > 9 {
                return Err(format!("cell {} holds digit {} outside 0-9", self.index, digit));
            }
        } else if self.secret {
            return Err(format!("cell {} is marked secret but holds no digit", self.index));
        }
        Ok(())
    }
}
