use super::seat_map::SeatMap;
use crate::error::ReservationError;
use crate::models::Seat;

/// First-fit selection: the first `n` free seats in row-major scan order.
///
/// Fails with `NotEnoughSeats` when fewer than `n` seats are free; nothing is
/// partially selected in that case.
pub fn auto_select(map: &SeatMap, n: usize) -> Result<Vec<Seat>, ReservationError> {
    let selected: Vec<Seat> = map.available().take(n).collect();
    if selected.len() < n {
        return Err(ReservationError::NotEnoughSeats {
            requested: n,
            available: selected.len(),
        });
    }
    Ok(selected)
}
