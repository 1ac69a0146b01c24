pub mod airplane;
pub mod reservation;
pub mod seat;
pub mod user;

pub use airplane::{Airplane, AirplaneInfo, AirplaneSummary};
pub use reservation::{ReservationRequest, SeatRequest, UserReservation};
pub use seat::{ReservedSeat, Seat};
pub use user::{Credentials, User, UserRecord};
