//! Data store seams.
//!
//! The HTTP layer and the reservation service only talk to these traits.
//! `Database` (Postgres) implements them for production, `MemoryRepository`
//! for local runs without infrastructure and for tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Airplane, ReservedSeat, Seat, User, UserReservation};

pub use memory::MemoryRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// A seat in the batch was taken between validation and insert.
    #[error("seat already reserved")]
    SeatTaken,
}

#[async_trait]
pub trait AirplaneRepository: Send + Sync {
    async fn list_airplanes(&self) -> Result<Vec<Airplane>, RepositoryError>;

    async fn get_airplane(&self, id: i32) -> Result<Option<Airplane>, RepositoryError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Every reserved seat of the airplane, ordered by reservation id.
    async fn airplane_reservations(
        &self,
        airplane_id: i32,
    ) -> Result<Vec<ReservedSeat>, RepositoryError>;

    /// The user's reservations grouped per airplane, ordered by airplane id.
    async fn user_reservations(
        &self,
        user_id: i32,
    ) -> Result<Vec<UserReservation>, RepositoryError>;

    /// Inserts all seats or none. Fails with `SeatTaken` if any seat is
    /// already reserved on the airplane.
    async fn add_reservations(
        &self,
        airplane_id: i32,
        user_id: i32,
        seats: &[Seat],
    ) -> Result<(), RepositoryError>;

    /// Returns the number of seats released.
    async fn delete_reservations(
        &self,
        airplane_id: i32,
        user_id: i32,
    ) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Looks the user up by (already normalized) email and checks the password.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, RepositoryError>;

    async fn get_user(&self, id: i32) -> Result<Option<User>, RepositoryError>;
}
