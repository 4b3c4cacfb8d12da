//! Remote repository traits
//!
//! These traits define what the client needs from the cinema backend,
//! allowing for different implementations (HTTP gateway, in-memory fakes).

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Credentials, Identity, Movie, NewReservation, Reservation, ReservationId,
    ReservationMutation, ReservationUpdate, Screening, ScreeningId,
};

/// Movie catalogue
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// List all movies
    async fn list_movies(&self) -> Result<Vec<Movie>>;
}

/// Screenings and their seat availability
#[async_trait]
pub trait ScreeningRepository: Send + Sync {
    /// List all screenings
    async fn list_screenings(&self) -> Result<Vec<Screening>>;

    /// Fetch a fresh snapshot of one screening
    async fn get_screening(&self, id: ScreeningId) -> Result<Option<Screening>>;
}

/// Reservation reads and writes
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// List reservations visible to the client (all owners)
    async fn list_reservations(&self) -> Result<Vec<Reservation>>;

    /// Create a reservation, returning the backend-assigned id.
    ///
    /// `None` means the reservation was stored but the backend did not say
    /// under which id.
    async fn create_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Option<ReservationId>>;

    /// Replace the seats of a reservation
    async fn update_reservation(&self, update: &ReservationUpdate) -> Result<()>;

    /// Cancel a reservation
    async fn delete_reservation(&self, id: ReservationId) -> Result<()>;

    /// Find one reservation by id
    async fn find_reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        Ok(self
            .list_reservations()
            .await?
            .into_iter()
            .find(|r| r.id == id))
    }

    /// Submit a mutation built by the seat selection controller
    async fn apply_mutation(
        &self,
        mutation: &ReservationMutation,
    ) -> Result<Option<ReservationId>> {
        match mutation {
            ReservationMutation::Create(new) => self.create_reservation(new).await,
            ReservationMutation::Update(update) => {
                self.update_reservation(update).await?;
                Ok(Some(update.reservation_id))
            }
        }
    }
}

/// Account login and registration
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// Verify credentials; returns the identity to cache on success
    async fn login(&self, credentials: &Credentials) -> Result<Identity>;

    /// Create a new account
    async fn register(&self, credentials: &Credentials) -> Result<()>;
}

/// Combined backend interface
///
/// Implementations may be backed by the HTTP gateway or by test fakes.
pub trait CinemaBackend:
    MovieRepository + ScreeningRepository + ReservationRepository + AccountGateway
{
}

// Blanket implementation: any type implementing all traits implements CinemaBackend
impl<T> CinemaBackend for T where
    T: MovieRepository + ScreeningRepository + ReservationRepository + AccountGateway
{
}
