use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{auto_select::auto_select, seat_map::SeatMap, seat_map::SeatMapSummary, validation};
use crate::error::{AppError, ReservationError};
use crate::models::{Airplane, AirplaneInfo, ReservedSeat, Seat, UserReservation};
use crate::repository::{AirplaneRepository, RepositoryError, ReservationRepository};

/// Reservation flow on top of the data store.
///
/// Checks run in a fixed order: duplicates, airplane existence, the
/// one-reservation rule, seat geometry, availability. Only a request that
/// passes all of them reaches `add_reservations`, which writes the whole
/// batch in one transaction.
#[derive(Clone)]
pub struct ReservationService {
    airplanes: Arc<dyn AirplaneRepository>,
    reservations: Arc<dyn ReservationRepository>,
    single_airplane_per_user: bool,
}

impl ReservationService {
    pub fn new(
        airplanes: Arc<dyn AirplaneRepository>,
        reservations: Arc<dyn ReservationRepository>,
        single_airplane_per_user: bool,
    ) -> Self {
        Self { airplanes, reservations, single_airplane_per_user }
    }

    pub async fn list_airplanes(&self) -> Result<Vec<Airplane>, AppError> {
        Ok(self.airplanes.list_airplanes().await?)
    }

    async fn airplane(&self, id: i32) -> Result<Airplane, AppError> {
        self.airplanes
            .get_airplane(id)
            .await?
            .ok_or_else(|| ReservationError::AirplaneNotFound.into())
    }

    pub async fn airplane_info(&self, id: i32) -> Result<AirplaneInfo, AppError> {
        let airplane = self.airplane(id).await?;
        let reserved_seats = self.reservations.airplane_reservations(id).await?;
        Ok(AirplaneInfo { airplane, reserved_seats })
    }

    async fn seat_map(&self, id: i32) -> Result<SeatMap, AppError> {
        let info = self.airplane_info(id).await?;
        Ok(SeatMap::new(&info.airplane, info.reserved_seats.iter().map(ReservedSeat::seat)))
    }

    pub async fn summary(&self, id: i32) -> Result<SeatMapSummary, AppError> {
        Ok(self.seat_map(id).await?.summary())
    }

    /// First `n` free seats in scan order. Nothing is reserved.
    pub async fn suggest(&self, id: i32, n: usize) -> Result<Vec<Seat>, AppError> {
        let map = self.seat_map(id).await?;
        Ok(auto_select(&map, n)?)
    }

    pub async fn reserve(&self, user_id: i32, airplane_id: i32, seats: &[Seat]) -> Result<(), AppError> {
        validation::check_duplicates(seats)?;

        let airplane = self.airplane(airplane_id).await?;
        let (held, reserved) = tokio::try_join!(
            self.reservations.user_reservations(user_id),
            self.reservations.airplane_reservations(airplane_id),
        )?;

        validation::check_holdings(&held, airplane_id, self.single_airplane_per_user)?;
        validation::check_bounds(&airplane, seats)?;
        validation::check_available(seats, &reserved)?;

        let mut retried = false;
        loop {
            match self.reservations.add_reservations(airplane_id, user_id, seats).await {
                Ok(()) => {
                    info!(
                        "User {} reserved {} on airplane {}",
                        user_id,
                        labels(seats.iter().copied()),
                        airplane_id
                    );
                    return Ok(());
                }
                Err(RepositoryError::SeatTaken) => {
                    // lost a race against a concurrent request; report who won
                    let reserved = self.reservations.airplane_reservations(airplane_id).await?;
                    let taken = validation::occupied(seats, &reserved);
                    if !taken.is_empty() {
                        warn!(
                            "User {} lost seats {} on airplane {}",
                            user_id,
                            labels(taken.iter().map(ReservedSeat::seat)),
                            airplane_id
                        );
                        return Err(ReservationError::SeatsUnavailable(taken).into());
                    }
                    if retried {
                        return Err(RepositoryError::SeatTaken.into());
                    }
                    // the winner let go of the seats before we looked
                    debug!("Retrying reservation of user {} on airplane {}", user_id, airplane_id);
                    retried = true;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn cancel(&self, user_id: i32, airplane_id: i32) -> Result<u64, AppError> {
        let released = self.reservations.delete_reservations(airplane_id, user_id).await?;
        info!("User {} released {} seats on airplane {}", user_id, released, airplane_id);
        Ok(released)
    }

    pub async fn user_reservations(&self, user_id: i32) -> Result<Vec<UserReservation>, AppError> {
        Ok(self.reservations.user_reservations(user_id).await?)
    }
}

fn labels(seats: impl Iterator<Item = Seat>) -> String {
    seats.map(|seat| seat.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RIVAL: i32 = 99;

    /// Lets a rival booking land between validation and the first insert.
    struct Contended {
        inner: Arc<MemoryRepository>,
        rival_seat: Seat,
        rival_cancels: bool,
        inserts: AtomicUsize,
    }

    impl Contended {
        fn new(inner: Arc<MemoryRepository>, rival_seat: Seat, rival_cancels: bool) -> Self {
            Self { inner, rival_seat, rival_cancels, inserts: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl ReservationRepository for Contended {
        async fn airplane_reservations(
            &self,
            airplane_id: i32,
        ) -> Result<Vec<ReservedSeat>, RepositoryError> {
            self.inner.airplane_reservations(airplane_id).await
        }

        async fn user_reservations(
            &self,
            user_id: i32,
        ) -> Result<Vec<UserReservation>, RepositoryError> {
            self.inner.user_reservations(user_id).await
        }

        async fn add_reservations(
            &self,
            airplane_id: i32,
            user_id: i32,
            seats: &[Seat],
        ) -> Result<(), RepositoryError> {
            if self.inserts.fetch_add(1, Ordering::SeqCst) == 0 {
                self.inner.add_reservations(airplane_id, RIVAL, &[self.rival_seat]).await?;
                let result = self.inner.add_reservations(airplane_id, user_id, seats).await;
                if self.rival_cancels {
                    self.inner.delete_reservations(airplane_id, RIVAL).await?;
                }
                return result;
            }
            self.inner.add_reservations(airplane_id, user_id, seats).await
        }

        async fn delete_reservations(
            &self,
            airplane_id: i32,
            user_id: i32,
        ) -> Result<u64, RepositoryError> {
            self.inner.delete_reservations(airplane_id, user_id).await
        }
    }

    fn service(single_airplane: bool) -> (ReservationService, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::with_default_fleet());
        (ReservationService::new(repo.clone(), repo.clone(), single_airplane), repo)
    }

    fn unwrap_rejection(err: AppError) -> ReservationError {
        match err {
            AppError::Reservation(e) => e,
            other => panic!("expected a reservation rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn reserve_then_read_back() {
        let (svc, _) = service(true);
        svc.reserve(1, 1, &[Seat::new(1, 1), Seat::new(1, 2)]).await.unwrap();

        let info = svc.airplane_info(1).await.unwrap();
        assert_eq!(info.reserved_seats.len(), 2);

        let mine = svc.user_reservations(1).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].kind, "local");
    }

    #[tokio::test]
    async fn occupied_seat_is_reported() {
        let (svc, _) = service(true);
        svc.reserve(1, 1, &[Seat::new(2, 3)]).await.unwrap();

        let err = svc.reserve(2, 1, &[Seat::new(2, 2), Seat::new(2, 3)]).await.unwrap_err();
        match unwrap_rejection(err) {
            ReservationError::SeatsUnavailable(taken) => {
                assert_eq!(taken.len(), 1);
                assert_eq!(taken[0].seat(), Seat::new(2, 3));
            }
            other => panic!("unexpected {:?}", other),
        }
        // nothing from the failed batch was written
        assert!(svc.user_reservations(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_airplane_rejected_when_single_airplane_rule_on() {
        let (svc, _) = service(true);
        svc.reserve(1, 1, &[Seat::new(1, 1)]).await.unwrap();

        let err = svc.reserve(1, 2, &[Seat::new(1, 1)]).await.unwrap_err();
        assert!(matches!(
            unwrap_rejection(err),
            ReservationError::ReservedElsewhere { airplane_id: 1 }
        ));
    }

    #[tokio::test]
    async fn second_airplane_allowed_with_per_airplane_rule() {
        let (svc, _) = service(false);
        svc.reserve(1, 1, &[Seat::new(1, 1)]).await.unwrap();
        svc.reserve(1, 2, &[Seat::new(1, 1)]).await.unwrap();

        let err = svc.reserve(1, 1, &[Seat::new(5, 1)]).await.unwrap_err();
        assert!(matches!(unwrap_rejection(err), ReservationError::AlreadyReserved));
    }

    #[tokio::test]
    async fn checks_run_in_order() {
        let (svc, _) = service(true);
        // duplicates win over bounds
        let err = svc.reserve(1, 1, &[Seat::new(99, 1), Seat::new(99, 1)]).await.unwrap_err();
        assert!(matches!(unwrap_rejection(err), ReservationError::DuplicateSeats(_)));

        let err = svc.reserve(1, 42, &[Seat::new(1, 1)]).await.unwrap_err();
        assert!(matches!(unwrap_rejection(err), ReservationError::AirplaneNotFound));

        let err = svc.reserve(1, 1, &[Seat::new(1, 5)]).await.unwrap_err();
        match unwrap_rejection(err) {
            ReservationError::InvalidSeats(seats) => assert_eq!(seats, vec![Seat::new(1, 5)]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn cancel_frees_seats_for_others() {
        let (svc, _) = service(true);
        svc.reserve(1, 1, &[Seat::new(1, 1)]).await.unwrap();
        assert_eq!(svc.cancel(1, 1).await.unwrap(), 1);

        svc.reserve(2, 1, &[Seat::new(1, 1)]).await.unwrap();
        svc.reserve(1, 2, &[Seat::new(1, 1)]).await.unwrap();
    }

    #[tokio::test]
    async fn suggestion_and_summary_follow_reservations() {
        let (svc, repo) = service(true);
        let tiny = repo.add_airplane("tiny", 2, 2).await;
        svc.reserve(1, tiny.id, &[Seat::new(1, 1)]).await.unwrap();

        let picked = svc.suggest(tiny.id, 2).await.unwrap();
        assert_eq!(picked, vec![Seat::new(1, 2), Seat::new(2, 1)]);

        let summary = svc.summary(tiny.id).await.unwrap();
        assert_eq!((summary.total, summary.reserved, summary.available), (4, 1, 3));

        let err = svc.suggest(tiny.id, 4).await.unwrap_err();
        assert!(matches!(
            unwrap_rejection(err),
            ReservationError::NotEnoughSeats { requested: 4, available: 3 }
        ));
    }

    #[tokio::test]
    async fn lost_race_reports_the_winning_seat() {
        let repo = Arc::new(MemoryRepository::with_default_fleet());
        let contended = Arc::new(Contended::new(repo.clone(), Seat::new(3, 2), false));
        let svc = ReservationService::new(repo.clone(), contended.clone(), true);

        let err = svc.reserve(1, 1, &[Seat::new(3, 1), Seat::new(3, 2)]).await.unwrap_err();
        match unwrap_rejection(err) {
            ReservationError::SeatsUnavailable(taken) => {
                let seats: Vec<Seat> = taken.iter().map(ReservedSeat::seat).collect();
                assert_eq!(seats, vec![Seat::new(3, 2)]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(contended.inserts.load(Ordering::SeqCst), 1);
        assert!(svc.user_reservations(1).await.unwrap().is_empty());
        assert_eq!(svc.user_reservations(RIVAL).await.unwrap()[0].reserved_seats.len(), 1);
    }

    #[tokio::test]
    async fn retries_once_when_the_winner_already_cancelled() {
        let repo = Arc::new(MemoryRepository::with_default_fleet());
        let contended = Arc::new(Contended::new(repo.clone(), Seat::new(3, 2), true));
        let svc = ReservationService::new(repo.clone(), contended.clone(), true);

        svc.reserve(1, 1, &[Seat::new(3, 1), Seat::new(3, 2)]).await.unwrap();

        assert_eq!(contended.inserts.load(Ordering::SeqCst), 2);
        let mine = svc.user_reservations(1).await.unwrap();
        assert_eq!(mine[0].reserved_seats.len(), 2);
        assert!(svc.user_reservations(RIVAL).await.unwrap().is_empty());
    }
}
