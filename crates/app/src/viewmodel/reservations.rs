//! "My reservations" view model

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use cinema_core::{
    format_seat_numbers, CinemaBackend, Error, Identity, Movie, MovieRepository, Reservation,
    ReservationId, ReservationRepository, Result, Screening, ScreeningRepository,
    SessionProvider, Ticket,
};
use tracing::{debug, info, instrument};

use crate::flow::FlowScope;

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationItem {
    pub reservation_id: ReservationId,
    pub movie_title: String,
    /// `None` when the screening is no longer listed
    pub start_time: Option<NaiveDateTime>,
    pub seats: String,
}

pub struct ReservationsView {
    backend: Arc<dyn CinemaBackend>,
    scope: FlowScope,
    identity: Identity,
    reservations: Vec<Reservation>,
    screenings: Vec<Screening>,
    movies: Vec<Movie>,
}

impl ReservationsView {
    /// Load the current user's reservations along with the screenings and
    /// movies needed to describe them
    #[instrument(skip_all, fields(flow_id = %scope.id()))]
    pub async fn open(
        scope: FlowScope,
        backend: Arc<dyn CinemaBackend>,
        session: &dyn SessionProvider,
    ) -> Result<Self> {
        let identity = session.current_identity().ok_or(Error::NotAuthenticated)?;

        let (reservations, screenings, movies) = scope
            .guard(async {
                tokio::try_join!(
                    backend.list_reservations(),
                    backend.list_screenings(),
                    backend.list_movies(),
                )
            })
            .await?;

        let reservations: Vec<Reservation> = reservations
            .into_iter()
            .filter(|r| r.is_owned_by(&identity.username))
            .collect();
        debug!(count = reservations.len(), username = %identity.username, "Reservations loaded");

        Ok(Self {
            backend,
            scope,
            identity,
            reservations,
            screenings,
            movies,
        })
    }

    pub fn scope(&self) -> &FlowScope {
        &self.scope
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn items(&self) -> Vec<ReservationItem> {
        self.reservations
            .iter()
            .map(|r| {
                let screening = self.screening_for(r);
                ReservationItem {
                    reservation_id: r.id,
                    movie_title: screening
                        .and_then(|s| self.movie_for(s))
                        .map(|m| m.display_title().to_string())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    start_time: screening.map(|s| s.start_time),
                    seats: format_seat_numbers(&r.seats),
                }
            })
            .collect()
    }

    /// Cancel a reservation; it leaves the list once the backend confirms
    #[instrument(skip(self), fields(username = %self.identity.username))]
    pub async fn delete(&mut self, id: ReservationId) -> Result<()> {
        self.find(id)?;
        self.scope.guard(self.backend.delete_reservation(id)).await?;
        self.reservations.retain(|r| r.id != id);
        info!(reservation_id = %id, "Reservation removed from list");
        Ok(())
    }

    pub fn ticket(&self, id: ReservationId) -> Result<Ticket> {
        let reservation = self.find(id)?;
        let screening = self.screening_for(reservation);
        let movie = screening.and_then(|s| self.movie_for(s));
        Ok(Ticket::new(reservation, screening, movie))
    }

    /// Write the ticket for `id` into `dir`
    pub fn export_ticket(&self, id: ReservationId, dir: &Path) -> Result<PathBuf> {
        self.ticket(id)?.save_to(dir)
    }

    fn find(&self, id: ReservationId) -> Result<&Reservation> {
        self.reservations
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("reservation {id}")))
    }

    fn screening_for(&self, reservation: &Reservation) -> Option<&Screening> {
        self.screenings
            .iter()
            .find(|s| s.id == reservation.screening_id)
    }

    fn movie_for(&self, screening: &Screening) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == screening.movie_id)
    }
}

impl Drop for ReservationsView {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
