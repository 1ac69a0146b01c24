use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ReservedSeat, Seat};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airplane {
    pub id: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub n_rows: i32,
    pub seats_per_row: i32,
}

impl Airplane {
    /// True when the coordinate exists on this airplane.
    pub fn contains(&self, seat: &Seat) -> bool {
        (1..=self.n_rows).contains(&seat.row_number)
            && (1..=self.seats_per_row).contains(&seat.seat_number)
    }

    pub fn capacity(&self) -> usize {
        (self.n_rows.max(0) as usize) * (self.seats_per_row.max(0) as usize)
    }
}

// GET /api/airplanes
#[derive(Debug, Clone, Serialize)]
pub struct AirplaneSummary {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<Airplane> for AirplaneSummary {
    fn from(airplane: Airplane) -> Self {
        Self { id: airplane.id, kind: airplane.kind }
    }
}

// GET /api/airplanes/{id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirplaneInfo {
    #[serde(flatten)]
    pub airplane: Airplane,
    pub reserved_seats: Vec<ReservedSeat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airplane() -> Airplane {
        Airplane { id: 1, kind: "local".into(), n_rows: 15, seats_per_row: 4 }
    }

    #[test]
    fn bounds_are_inclusive() {
        let plane = airplane();
        assert!(plane.contains(&Seat::new(1, 1)));
        assert!(plane.contains(&Seat::new(15, 4)));
        assert!(!plane.contains(&Seat::new(0, 1)));
        assert!(!plane.contains(&Seat::new(16, 1)));
        assert!(!plane.contains(&Seat::new(1, 5)));
        assert!(!plane.contains(&Seat::new(3, -1)));
        assert_eq!(plane.capacity(), 60);
    }

    #[test]
    fn info_flattens_airplane() {
        let info = AirplaneInfo {
            airplane: airplane(),
            reserved_seats: vec![ReservedSeat { id: 7, row_number: 2, seat_number: 3 }],
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "local");
        assert_eq!(json["nRows"], 15);
        assert_eq!(json["seatsPerRow"], 4);
        assert_eq!(json["reservedSeats"][0]["rowNumber"], 2);
    }
}
