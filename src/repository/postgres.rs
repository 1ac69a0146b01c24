use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;

use super::{AirplaneRepository, RepositoryError, ReservationRepository, UserRepository};
use crate::database::Database;
use crate::models::{Airplane, ReservedSeat, Seat, User, UserRecord, UserReservation};

#[async_trait]
impl AirplaneRepository for Database {
    async fn list_airplanes(&self) -> Result<Vec<Airplane>, RepositoryError> {
        let airplanes = sqlx::query_as::<_, Airplane>(
            "SELECT id, type, n_rows, seats_per_row FROM airplanes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(airplanes)
    }

    async fn get_airplane(&self, id: i32) -> Result<Option<Airplane>, RepositoryError> {
        let airplane = sqlx::query_as::<_, Airplane>(
            "SELECT id, type, n_rows, seats_per_row FROM airplanes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(airplane)
    }
}

#[async_trait]
impl ReservationRepository for Database {
    async fn airplane_reservations(
        &self,
        airplane_id: i32,
    ) -> Result<Vec<ReservedSeat>, RepositoryError> {
        let seats = sqlx::query_as::<_, ReservedSeat>(
            "SELECT id, row_number, seat_number FROM reservations
             WHERE airplane_id = $1
             ORDER BY id",
        )
        .bind(airplane_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(seats)
    }

    async fn user_reservations(
        &self,
        user_id: i32,
    ) -> Result<Vec<UserReservation>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id AS rid, r.row_number, r.seat_number, a.id AS aid, a.type
            FROM reservations r
            JOIN airplanes a ON a.id = r.airplane_id
            WHERE r.user_id = $1
            ORDER BY a.id, r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: BTreeMap<i32, UserReservation> = BTreeMap::new();
        for row in rows {
            let airplane_id: i32 = row.try_get("aid")?;
            let seat = ReservedSeat {
                id: row.try_get("rid")?,
                row_number: row.try_get("row_number")?,
                seat_number: row.try_get("seat_number")?,
            };
            match grouped.get_mut(&airplane_id) {
                Some(entry) => entry.reserved_seats.push(seat),
                None => {
                    grouped.insert(
                        airplane_id,
                        UserReservation {
                            airplane_id,
                            kind: row.try_get("type")?,
                            reserved_seats: vec![seat],
                        },
                    );
                }
            }
        }
        Ok(grouped.into_values().collect())
    }

    async fn add_reservations(
        &self,
        airplane_id: i32,
        user_id: i32,
        seats: &[Seat],
    ) -> Result<(), RepositoryError> {
        if seats.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO reservations (airplane_id, user_id, row_number, seat_number) ",
        );
        builder.push_values(seats, |mut b, seat| {
            b.push_bind(airplane_id)
                .push_bind(user_id)
                .push_bind(seat.row_number)
                .push_bind(seat.seat_number);
        });

        match builder.build().execute(&mut *tx).await {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::warn!(
                    "add_reservations: seat conflict on airplane {} for user {}",
                    airplane_id,
                    user_id
                );
                let _ = tx.rollback().await;
                return Err(RepositoryError::SeatTaken);
            }
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(e.into());
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_reservations(
        &self,
        airplane_id: i32,
        user_id: i32,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM reservations WHERE airplane_id = $1 AND user_id = $2")
            .bind(airplane_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) if record.verify_password(password)? => Ok(Some(record.into())),
            _ => Ok(None),
        }
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT id, email, name FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
