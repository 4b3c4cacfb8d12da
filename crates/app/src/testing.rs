//! In-memory backend for flow tests

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use cinema_core::{
    AccountGateway, Credentials, Error, Identity, Movie, MovieId, MovieRepository,
    NewReservation, Reservation, ReservationId, ReservationRepository, ReservationUpdate, Result,
    Screening, ScreeningId, ScreeningRepository, SeatIndex,
};

/// Seat-arbitrating fake: a write claiming a taken seat is rejected with
/// "seat taken", like the real backend.
#[derive(Default)]
pub struct InMemoryBackend {
    movies: Mutex<Vec<Movie>>,
    screenings: Mutex<Vec<Screening>>,
    reservations: Mutex<Vec<Reservation>>,
    accounts: Mutex<HashMap<String, String>>,
    next_id: AtomicI64,
    offline: AtomicBool,
    withhold_ids: AtomicBool,
    screening_fetches: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn add_movie(&self, id: i64, title: &str) {
        self.movies
            .lock()
            .unwrap()
            .push(Movie::new(MovieId(id), title));
    }

    pub fn add_screening(&self, id: i64, movie_id: i64, seats: &[bool]) {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        self.screenings.lock().unwrap().push(Screening {
            id: ScreeningId(id),
            movie_id: MovieId(movie_id),
            start_time: start,
            end_time: start + chrono::Duration::hours(2),
            available_seats: seats.to_vec(),
        });
    }

    /// Book seats directly, marking them taken
    pub fn add_reservation(&self, id: i64, screening_id: i64, owner: &str, seats: &[SeatIndex]) {
        let seats: BTreeSet<SeatIndex> = seats.iter().copied().collect();
        self.set_seats(ScreeningId(screening_id), &seats, false);
        self.reservations.lock().unwrap().push(Reservation {
            id: ReservationId(id),
            screening_id: ScreeningId(screening_id),
            owner_username: owner.to_string(),
            seats,
        });
    }

    pub fn add_account(&self, username: &str, password: &str) {
        self.accounts
            .lock()
            .unwrap()
            .insert(username.to_string(), password.to_string());
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Make every call fail with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Store new reservations but answer creates without their id
    pub fn set_withhold_ids(&self, withhold: bool) {
        self.withhold_ids.store(withhold, Ordering::SeqCst);
    }

    pub fn screening_fetches(&self) -> usize {
        self.screening_fetches.load(Ordering::SeqCst)
    }

    pub fn reservation(&self, id: i64) -> Option<Reservation> {
        self.reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == ReservationId(id))
            .cloned()
    }

    pub fn availability(&self, screening_id: i64) -> Vec<bool> {
        self.screenings
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == ScreeningId(screening_id))
            .map(|s| s.available_seats.clone())
            .unwrap_or_default()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn set_seats(&self, screening_id: ScreeningId, seats: &BTreeSet<SeatIndex>, free: bool) {
        let mut screenings = self.screenings.lock().unwrap();
        if let Some(screening) = screenings.iter_mut().find(|s| s.id == screening_id) {
            for &i in seats {
                if let Some(slot) = screening.available_seats.get_mut(i) {
                    *slot = free;
                }
            }
        }
    }

    /// Claim `wanted`, treating `released` as free
    fn claim(
        &self,
        screening_id: ScreeningId,
        wanted: &BTreeSet<SeatIndex>,
        released: &BTreeSet<SeatIndex>,
    ) -> Result<()> {
        let screenings = self.screenings.lock().unwrap();
        let screening = screenings
            .iter()
            .find(|s| s.id == screening_id)
            .ok_or_else(|| Error::MutationRejected("screening not found".into()))?;

        let all_free = wanted
            .iter()
            .all(|i| screening.is_free(*i) || released.contains(i));
        if !all_free {
            return Err(Error::MutationRejected("seat taken".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MovieRepository for InMemoryBackend {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        self.check_online()?;
        Ok(self.movies.lock().unwrap().clone())
    }
}

#[async_trait]
impl ScreeningRepository for InMemoryBackend {
    async fn list_screenings(&self) -> Result<Vec<Screening>> {
        self.check_online()?;
        Ok(self.screenings.lock().unwrap().clone())
    }

    async fn get_screening(&self, id: ScreeningId) -> Result<Option<Screening>> {
        self.check_online()?;
        self.screening_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .screenings
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryBackend {
    async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        self.check_online()?;
        Ok(self.reservations.lock().unwrap().clone())
    }

    async fn create_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Option<ReservationId>> {
        self.check_online()?;
        self.claim(reservation.screening_id, &reservation.seats, &BTreeSet::new())?;
        self.set_seats(reservation.screening_id, &reservation.seats, false);

        let id = ReservationId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.reservations.lock().unwrap().push(Reservation {
            id,
            screening_id: reservation.screening_id,
            owner_username: reservation.owner_username.clone(),
            seats: reservation.seats.clone(),
        });
        if self.withhold_ids.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(id))
    }

    async fn update_reservation(&self, update: &ReservationUpdate) -> Result<()> {
        self.check_online()?;
        let previous = self
            .reservation(update.reservation_id.0)
            .ok_or_else(|| Error::MutationRejected("reservation not found".into()))?;

        self.claim(update.screening_id, &update.seats, &previous.seats)?;
        self.set_seats(update.screening_id, &previous.seats, true);
        self.set_seats(update.screening_id, &update.seats, false);

        let mut reservations = self.reservations.lock().unwrap();
        if let Some(r) = reservations.iter_mut().find(|r| r.id == update.reservation_id) {
            r.seats = update.seats.clone();
        }
        Ok(())
    }

    async fn delete_reservation(&self, id: ReservationId) -> Result<()> {
        self.check_online()?;
        let removed = self
            .reservation(id.0)
            .ok_or_else(|| Error::MutationRejected("reservation not found".into()))?;

        self.set_seats(removed.screening_id, &removed.seats, true);
        self.reservations.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}

#[async_trait]
impl AccountGateway for InMemoryBackend {
    async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        self.check_online()?;
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(&credentials.username) {
            Some(password) if *password == credentials.password => {
                Ok(Identity::new(credentials.username.clone()))
            }
            _ => Err(Error::Authentication("Invalid username or password.".into())),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<()> {
        self.check_online()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&credentials.username) {
            return Err(Error::Authentication(
                "Registration failed. User can already exist.".into(),
            ));
        }
        accounts.insert(credentials.username.clone(), credentials.password.clone());
        Ok(())
    }
}
