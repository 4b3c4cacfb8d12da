//! Reservation editing view model

use std::collections::BTreeSet;
use std::sync::Arc;

use cinema_core::invariants::assert_mutation_invariants;
use cinema_core::{
    format_seat_numbers, CinemaBackend, Error, MutationMode, ReservationId,
    ReservationRepository, Result, ScreeningRepository, SeatIndex, SeatSelectionController,
    SeatView, SessionProvider,
};
use tracing::{info, instrument};

use super::reservation::{refresh_after_write, resolve_seat_numbers};
use super::Route;
use crate::flow::FlowScope;

pub const UPDATE_SUCCESS: &str = "Reservation updated successfully.";

/// Changes the seats of one of the current user's reservations.
///
/// Seats the reservation already holds start out selected and stay
/// selectable even though the server reports them as taken.
pub struct ReservationEditFlow {
    backend: Arc<dyn CinemaBackend>,
    session: Arc<dyn SessionProvider>,
    scope: FlowScope,
    controller: SeatSelectionController,
}

impl ReservationEditFlow {
    #[instrument(skip(scope, backend, session), fields(flow_id = %scope.id()))]
    pub async fn open(
        scope: FlowScope,
        backend: Arc<dyn CinemaBackend>,
        session: Arc<dyn SessionProvider>,
        reservation_id: ReservationId,
    ) -> Result<Self> {
        let identity = session.current_identity().ok_or(Error::NotAuthenticated)?;

        let reservation = scope
            .guard(backend.find_reservation(reservation_id))
            .await?
            .filter(|r| r.is_owned_by(&identity.username));

        let screening = match &reservation {
            Some(r) => scope.guard(backend.get_screening(r.screening_id)).await?,
            None => None,
        };

        let controller =
            SeatSelectionController::for_existing_reservation(screening.as_ref(), reservation.as_ref())?;

        Ok(Self {
            backend,
            session,
            scope,
            controller,
        })
    }

    pub fn scope(&self) -> &FlowScope {
        &self.scope
    }

    pub fn controller(&self) -> &SeatSelectionController {
        &self.controller
    }

    pub fn seat_map(&self) -> Vec<SeatView> {
        self.controller.seat_map()
    }

    pub fn toggle(&mut self, index: SeatIndex) {
        self.controller.toggle(index);
    }

    /// Make the selection exactly the given 1-based seat numbers.
    ///
    /// Fails without touching the selection when a held seat can no longer
    /// be released, e.g. it lies beyond the screening's seat map.
    pub fn set_seat_numbers(&mut self, numbers: &[usize]) -> Result<()> {
        let wanted = resolve_seat_numbers(&self.controller, numbers)?;
        let stuck: BTreeSet<SeatIndex> = self
            .controller
            .selected_seats()
            .difference(&wanted)
            .copied()
            .filter(|index| !self.controller.is_selectable(*index))
            .collect();
        if !stuck.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Seats {} cannot be released",
                format_seat_numbers(&stuck)
            )));
        }

        let changed: BTreeSet<SeatIndex> = self
            .controller
            .selected_seats()
            .symmetric_difference(&wanted)
            .copied()
            .collect();

        for index in changed {
            self.controller.toggle(index);
        }
        Ok(())
    }

    /// Replace the reservation's seats with the selection.
    ///
    /// Returns where to go next.
    #[instrument(skip(self), fields(flow_id = %self.scope.id(), screening_id = %self.controller.screening_id()))]
    pub async fn submit(&mut self) -> Result<Route> {
        let identity = self.session.current_identity();
        let mutation = self
            .controller
            .build_mutation_request(MutationMode::Update, identity.as_ref())?;
        assert_mutation_invariants(&mutation);

        let reservation_id = match self.scope.guard(self.backend.apply_mutation(&mutation)).await {
            Ok(id) => id,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => return Err(self.controller.on_mutation_failed(e)),
        };
        info!(reservation_id = ?reservation_id, "{}", UPDATE_SUCCESS);

        refresh_after_write(&self.scope, self.backend.as_ref(), &mut self.controller).await?;
        Ok(Route::Reservations)
    }
}

impl Drop for ReservationEditFlow {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
