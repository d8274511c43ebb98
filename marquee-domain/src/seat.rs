use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single seat position, written on the wire as row letter + column
/// number, e.g. `"B5"`. Columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatId {
    pub row: char,
    pub col: u8,
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.col)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid seat id: {0}")]
pub struct ParseSeatError(pub String);

impl FromStr for SeatId {
    type Err = ParseSeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let row = chars
            .next()
            .filter(|c| c.is_ascii_uppercase())
            .ok_or_else(|| ParseSeatError(s.to_string()))?;
        let rest = chars.as_str();
        // Canonical form only: plain digits with no leading zero, so "B05"
        // is never a second spelling of "B5".
        if rest.starts_with('0') || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseSeatError(s.to_string()));
        }
        let col: u8 = rest.parse().map_err(|_| ParseSeatError(s.to_string()))?;
        Ok(SeatId { row, col })
    }
}

impl Serialize for SeatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Fixed rectangular hall layout. Rows are lettered from 'A', columns are
/// numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGrid {
    pub rows: u8,
    pub columns: u8,
}

impl Default for SeatGrid {
    fn default() -> Self {
        // A1..G12, the layout every showtime uses in current scope.
        SeatGrid { rows: 7, columns: 12 }
    }
}

impl SeatGrid {
    pub fn new(rows: u8, columns: u8) -> Self {
        SeatGrid { rows, columns }
    }

    pub fn contains(&self, seat: &SeatId) -> bool {
        let row_index = (seat.row as u8).wrapping_sub(b'A');
        row_index < self.rows && seat.col >= 1 && seat.col <= self.columns
    }
}
