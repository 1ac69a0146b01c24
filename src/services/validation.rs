//! Pure checks run against a reservation request before anything is written.

use std::collections::HashSet;

use crate::error::ReservationError;
use crate::models::{Airplane, ReservedSeat, Seat, UserReservation};

/// Every occurrence of a coordinate after its first one.
pub fn find_duplicates(seats: &[Seat]) -> Vec<Seat> {
    let mut seen = HashSet::with_capacity(seats.len());
    seats.iter().filter(|s| !seen.insert(**s)).copied().collect()
}

pub fn out_of_bounds(airplane: &Airplane, seats: &[Seat]) -> Vec<Seat> {
    seats.iter().filter(|s| !airplane.contains(s)).copied().collect()
}

/// Existing reservations that collide with the requested seats.
pub fn occupied(seats: &[Seat], reserved: &[ReservedSeat]) -> Vec<ReservedSeat> {
    let wanted: HashSet<Seat> = seats.iter().copied().collect();
    reserved
        .iter()
        .filter(|r| wanted.contains(&r.seat()))
        .cloned()
        .collect()
}

pub fn check_duplicates(seats: &[Seat]) -> Result<(), ReservationError> {
    let duplicates = find_duplicates(seats);
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ReservationError::DuplicateSeats(duplicates))
    }
}

/// One reservation per (user, airplane). With `single_airplane` the user may
/// not hold seats on any other airplane either.
pub fn check_holdings(
    held: &[UserReservation],
    airplane_id: i32,
    single_airplane: bool,
) -> Result<(), ReservationError> {
    if held.iter().any(|r| r.airplane_id == airplane_id) {
        return Err(ReservationError::AlreadyReserved);
    }
    if single_airplane {
        if let Some(other) = held.iter().find(|r| !r.reserved_seats.is_empty()) {
            return Err(ReservationError::ReservedElsewhere { airplane_id: other.airplane_id });
        }
    }
    Ok(())
}

pub fn check_bounds(airplane: &Airplane, seats: &[Seat]) -> Result<(), ReservationError> {
    let invalid = out_of_bounds(airplane, seats);
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ReservationError::InvalidSeats(invalid))
    }
}

pub fn check_available(seats: &[Seat], reserved: &[ReservedSeat]) -> Result<(), ReservationError> {
    let taken = occupied(seats, reserved);
    if taken.is_empty() {
        Ok(())
    } else {
        Err(ReservationError::SeatsUnavailable(taken))
    }
}
