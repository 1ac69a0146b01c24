pub mod auto_select;
pub mod reservations;
pub mod seat_map;
pub mod validation;

pub use auto_select::auto_select;
pub use reservations::ReservationService;
pub use seat_map::{SeatMap, SeatMapSummary};
