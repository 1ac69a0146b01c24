use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{AirplaneRepository, RepositoryError, ReservationRepository, UserRepository};
use crate::models::{Airplane, ReservedSeat, Seat, User, UserRecord, UserReservation};
use crate::seed::DEFAULT_FLEET;

#[derive(Debug, Clone)]
struct Row {
    id: i32,
    airplane_id: i32,
    user_id: i32,
    seat: Seat,
}

#[derive(Debug, Default)]
struct Tables {
    airplanes: BTreeMap<i32, Airplane>,
    users: Vec<UserRecord>,
    reservations: Vec<Row>,
    next_reservation_id: i32,
}

/// In-process store. Check-and-insert of a seat batch happens under one
/// write guard, so concurrent requests cannot double-book a seat.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_fleet() -> Self {
        let mut tables = Tables::default();
        for (i, (kind, rows, per_row)) in DEFAULT_FLEET.iter().enumerate() {
            let id = i as i32 + 1;
            tables.airplanes.insert(
                id,
                Airplane { id, kind: kind.to_string(), n_rows: *rows, seats_per_row: *per_row },
            );
        }
        Self { tables: RwLock::new(tables) }
    }

    pub async fn add_airplane(&self, kind: &str, n_rows: i32, seats_per_row: i32) -> Airplane {
        let mut tables = self.tables.write().await;
        let id = tables.airplanes.keys().next_back().copied().unwrap_or(0) + 1;
        let airplane = Airplane { id, kind: kind.to_string(), n_rows, seats_per_row };
        tables.airplanes.insert(id, airplane.clone());
        airplane
    }

    /// Registers a user, hashing the password with the given bcrypt cost.
    pub async fn add_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        cost: u32,
    ) -> Result<User, RepositoryError> {
        let password_hash = bcrypt::hash(password, cost)?;
        let mut tables = self.tables.write().await;
        let id = tables.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let record = UserRecord {
            id,
            email: crate::models::user::normalize_email(email),
            name: name.to_string(),
            password_hash,
        };
        tables.users.push(record.clone());
        Ok(record.into())
    }
}

#[async_trait]
impl AirplaneRepository for MemoryRepository {
    async fn list_airplanes(&self) -> Result<Vec<Airplane>, RepositoryError> {
        Ok(self.tables.read().await.airplanes.values().cloned().collect())
    }

    async fn get_airplane(&self, id: i32) -> Result<Option<Airplane>, RepositoryError> {
        Ok(self.tables.read().await.airplanes.get(&id).cloned())
    }
}

#[async_trait]
impl ReservationRepository for MemoryRepository {
    async fn airplane_reservations(
        &self,
        airplane_id: i32,
    ) -> Result<Vec<ReservedSeat>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reservations
            .iter()
            .filter(|r| r.airplane_id == airplane_id)
            .map(|r| ReservedSeat {
                id: r.id,
                row_number: r.seat.row_number,
                seat_number: r.seat.seat_number,
            })
            .collect())
    }

    async fn user_reservations(
        &self,
        user_id: i32,
    ) -> Result<Vec<UserReservation>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut grouped: BTreeMap<i32, UserReservation> = BTreeMap::new();
        for row in tables.reservations.iter().filter(|r| r.user_id == user_id) {
            let Some(airplane) = tables.airplanes.get(&row.airplane_id) else {
                continue;
            };
            grouped
                .entry(row.airplane_id)
                .or_insert_with(|| UserReservation {
                    airplane_id: airplane.id,
                    kind: airplane.kind.clone(),
                    reserved_seats: Vec::new(),
                })
                .reserved_seats
                .push(ReservedSeat {
                    id: row.id,
                    row_number: row.seat.row_number,
                    seat_number: row.seat.seat_number,
                });
        }
        Ok(grouped.into_values().collect())
    }

    async fn add_reservations(
        &self,
        airplane_id: i32,
        user_id: i32,
        seats: &[Seat],
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .reservations
            .iter()
            .any(|r| r.airplane_id == airplane_id && seats.contains(&r.seat));
        if taken {
            return Err(RepositoryError::SeatTaken);
        }
        for seat in seats {
            tables.next_reservation_id += 1;
            let id = tables.next_reservation_id;
            tables.reservations.push(Row { id, airplane_id, user_id, seat: *seat });
        }
        debug!("memory store: {} seats added on airplane {}", seats.len(), airplane_id);
        Ok(())
    }

    async fn delete_reservations(
        &self,
        airplane_id: i32,
        user_id: i32,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.reservations.len();
        tables
            .reservations
            .retain(|r| !(r.airplane_id == airplane_id && r.user_id == user_id));
        Ok((before - tables.reservations.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let record = {
            let tables = self.tables.read().await;
            tables.users.iter().find(|u| u.email == email).cloned()
        };
        match record {
            Some(record) if record.verify_password(password)? => Ok(Some(record.into())),
            _ => Ok(None),
        }
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned().map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_fleet_is_loaded() {
        let repo = MemoryRepository::with_default_fleet();
        let airplanes = repo.list_airplanes().await.unwrap();
        assert_eq!(airplanes.len(), DEFAULT_FLEET.len());
        assert_eq!(airplanes[0].id, 1);
        assert_eq!(airplanes[0].kind, "local");
        assert!(repo.get_airplane(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_insert_is_all_or_nothing() {
        let repo = MemoryRepository::with_default_fleet();
        repo.add_reservations(1, 10, &[Seat::new(1, 1)]).await.unwrap();

        let err = repo
            .add_reservations(1, 11, &[Seat::new(2, 2), Seat::new(1, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::SeatTaken));

        let reserved = repo.airplane_reservations(1).await.unwrap();
        assert_eq!(reserved.len(), 1);
        assert_eq!(reserved[0].seat(), Seat::new(1, 1));
    }

    #[tokio::test]
    async fn same_seat_on_other_airplane_is_independent() {
        let repo = MemoryRepository::with_default_fleet();
        repo.add_reservations(1, 10, &[Seat::new(1, 1)]).await.unwrap();
        repo.add_reservations(2, 11, &[Seat::new(1, 1)]).await.unwrap();
        assert_eq!(repo.airplane_reservations(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn user_reservations_are_grouped_by_airplane() {
        let repo = MemoryRepository::with_default_fleet();
        repo.add_reservations(2, 10, &[Seat::new(3, 1), Seat::new(3, 2)]).await.unwrap();
        repo.add_reservations(1, 10, &[Seat::new(1, 1)]).await.unwrap();
        repo.add_reservations(1, 11, &[Seat::new(5, 1)]).await.unwrap();

        let mine = repo.user_reservations(10).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].airplane_id, 1);
        assert_eq!(mine[1].kind, "regional");
        assert_eq!(mine[1].reserved_seats.len(), 2);
    }

    #[tokio::test]
    async fn delete_only_touches_own_seats() {
        let repo = MemoryRepository::with_default_fleet();
        repo.add_reservations(1, 10, &[Seat::new(1, 1), Seat::new(1, 2)]).await.unwrap();
        repo.add_reservations(1, 11, &[Seat::new(2, 1)]).await.unwrap();

        assert_eq!(repo.delete_reservations(1, 10).await.unwrap(), 2);
        assert_eq!(repo.delete_reservations(1, 10).await.unwrap(), 0);
        assert_eq!(repo.airplane_reservations(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn authenticates_by_email_and_password() {
        let repo = MemoryRepository::new();
        let user = repo.add_user("User1@Test.com", "Alice", "password", 4).await.unwrap();
        assert_eq!(user.email, "user1@test.com");

        let found = repo.authenticate("user1@test.com", "password").await.unwrap();
        assert_eq!(found, Some(user.clone()));
        assert!(repo.authenticate("user1@test.com", "wrong").await.unwrap().is_none());
        assert!(repo.authenticate("nobody@test.com", "password").await.unwrap().is_none());
        assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user));
    }
}
