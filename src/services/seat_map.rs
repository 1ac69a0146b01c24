use serde::Serialize;
use std::collections::HashSet;

use crate::models::{Airplane, Seat};

/// Occupancy view of one airplane.
#[derive(Debug, Clone)]
pub struct SeatMap {
    n_rows: i32,
    seats_per_row: i32,
    reserved: HashSet<Seat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatMapSummary {
    pub total: usize,
    pub reserved: usize,
    pub available: usize,
}

impl SeatMap {
    /// Reserved coordinates outside the airplane are ignored.
    pub fn new(airplane: &Airplane, reserved: impl IntoIterator<Item = Seat>) -> Self {
        let reserved = reserved.into_iter().filter(|s| airplane.contains(s)).collect();
        Self {
            n_rows: airplane.n_rows,
            seats_per_row: airplane.seats_per_row,
            reserved,
        }
    }

    pub fn is_reserved(&self, seat: &Seat) -> bool {
        self.reserved.contains(seat)
    }

    /// Free seats, rows top to bottom and seats left to right.
    pub fn available(&self) -> impl Iterator<Item = Seat> + '_ {
        let per_row = self.seats_per_row;
        (1..=self.n_rows)
            .flat_map(move |row| (1..=per_row).map(move |seat| Seat::new(row, seat)))
            .filter(move |seat| !self.is_reserved(seat))
    }

    pub fn summary(&self) -> SeatMapSummary {
        let total = (self.n_rows.max(0) as usize) * (self.seats_per_row.max(0) as usize);
        let reserved = self.reserved.len();
        SeatMapSummary { total, reserved, available: total - reserved }
    }
}
