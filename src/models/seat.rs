use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A seat coordinate on an airplane. Ordering is row-major, which is also
/// the scan order used by automatic selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub row_number: i32,
    pub seat_number: i32,
}

impl Seat {
    pub fn new(row_number: i32, seat_number: i32) -> Self {
        Self { row_number, seat_number }
    }

    /// Seat letter within the row: 1 -> 'A', 2 -> 'B', ...
    pub fn letter(&self) -> Option<char> {
        self.seat_number
            .checked_sub(1)
            .and_then(|offset| u8::try_from(offset).ok())
            .filter(|offset| *offset < 26)
            .map(|offset| (b'A' + offset) as char)
    }
}

// 12C; seats past Z fall back to 12#27
impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter() {
            Some(letter) => write!(f, "{}{}", self.row_number, letter),
            None => write!(f, "{}#{}", self.row_number, self.seat_number),
        }
    }
}

/// A persisted reservation of one seat, as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedSeat {
    pub id: i32,
    pub row_number: i32,
    pub seat_number: i32,
}

impl ReservedSeat {
    pub fn seat(&self) -> Seat {
        Seat::new(self.row_number, self.seat_number)
    }
}
