use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ReservedSeat, Seat};

/// All seats a user holds on one airplane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReservation {
    pub airplane_id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub reserved_seats: Vec<ReservedSeat>,
}

// POST /api/airplanes/{id}/reservations
#[derive(Debug, Deserialize, Validate)]
pub struct ReservationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "No seats specified"))]
    #[validate(nested)]
    pub seats: Vec<SeatRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeatRequest {
    #[validate(range(min = 1, message = "rowNumber must be a positive integer"))]
    pub row_number: i32,
    #[validate(range(min = 1, message = "seatNumber must be a positive integer"))]
    pub seat_number: i32,
}

impl ReservationRequest {
    pub fn seats(&self) -> Vec<Seat> {
        self.seats
            .iter()
            .map(|s| Seat::new(s.row_number, s.seat_number))
            .collect()
    }
}
