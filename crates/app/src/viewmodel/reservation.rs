//! Seat booking view model
//!
//! Wraps a [`SeatSelectionController`] for one screening and drives it
//! against the backend: submit, then re-fetch the screening so the seat map
//! shows what the server now holds.

use std::collections::BTreeSet;
use std::sync::Arc;

use cinema_core::invariants::assert_mutation_invariants;
use cinema_core::{
    seat_index, CinemaBackend, Error, MutationMode, ReservationId, ReservationRepository,
    Result, ScreeningId, ScreeningRepository, SeatIndex, SeatSelectionController, SeatView,
    SessionProvider,
};
use tracing::{info, instrument, warn};

use crate::flow::FlowScope;

pub const RESERVATION_SUCCESS: &str = "Reservation successful.";

pub struct ReservationFlow {
    backend: Arc<dyn CinemaBackend>,
    session: Arc<dyn SessionProvider>,
    scope: FlowScope,
    controller: SeatSelectionController,
}

impl ReservationFlow {
    /// Load the screening and start with nothing selected.
    ///
    /// An unknown screening is `MissingContext`.
    #[instrument(skip(scope, backend, session), fields(flow_id = %scope.id()))]
    pub async fn open(
        scope: FlowScope,
        backend: Arc<dyn CinemaBackend>,
        session: Arc<dyn SessionProvider>,
        screening_id: ScreeningId,
    ) -> Result<Self> {
        let screening = scope.guard(backend.get_screening(screening_id)).await?;
        let controller = SeatSelectionController::for_new_reservation(screening.as_ref())?;

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

    /// Add the given 1-based seat numbers to the selection
    pub fn select_numbers(&mut self, numbers: &[usize]) -> Result<()> {
        let wanted = resolve_seat_numbers(&self.controller, numbers)?;
        for index in wanted {
            if !self.controller.is_selected(index) {
                self.controller.toggle(index);
            }
        }
        Ok(())
    }

    /// Book the selected seats.
    ///
    /// On success the selection is cleared and the seat map refreshed from
    /// the server. On failure the selection is left as it was. The id is
    /// `None` when the backend stored the booking without reporting one.
    #[instrument(skip(self), fields(flow_id = %self.scope.id(), screening_id = %self.controller.screening_id()))]
    pub async fn submit(&mut self) -> Result<Option<ReservationId>> {
        let identity = self.session.current_identity();
        let mutation = self
            .controller
            .build_mutation_request(MutationMode::Create, identity.as_ref())?;
        assert_mutation_invariants(&mutation);

        let reservation_id = match self.scope.guard(self.backend.apply_mutation(&mutation)).await {
            Ok(id) => id,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => return Err(self.controller.on_mutation_failed(e)),
        };
        info!(reservation_id = ?reservation_id, "{}", RESERVATION_SUCCESS);

        refresh_after_write(&self.scope, self.backend.as_ref(), &mut self.controller).await?;
        Ok(reservation_id)
    }
}

impl Drop for ReservationFlow {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// Map user-facing seat numbers to selectable indices
pub(super) fn resolve_seat_numbers(
    controller: &SeatSelectionController,
    numbers: &[usize],
) -> Result<BTreeSet<SeatIndex>> {
    numbers
        .iter()
        .map(|&number| {
            let index = seat_index(number)
                .filter(|i| *i < controller.availability().len())
                .ok_or_else(|| Error::InvalidInput(format!("No seat number {number}")))?;
            if !controller.is_selectable(index) {
                return Err(Error::InvalidInput(format!("Seat {number} is not available")));
            }
            Ok(index)
        })
        .collect()
}

/// Re-fetch the screening after a successful write and reset the controller.
///
/// The write already happened, so a failed refresh only leaves the seat map
/// stale; the selection is cleared either way.
pub(super) async fn refresh_after_write(
    scope: &FlowScope,
    backend: &dyn CinemaBackend,
    controller: &mut SeatSelectionController,
) -> Result<()> {
    let screening_id = controller.screening_id();
    let fresh = match scope.guard(backend.get_screening(screening_id)).await {
        Ok(Some(screening)) => screening.available_seats,
        Ok(None) => {
            warn!(screening_id = %screening_id, "Screening vanished after write, keeping stale seat map");
            controller.availability().to_vec()
        }
        Err(Error::Cancelled) => return Err(Error::Cancelled),
        Err(e) => {
            warn!(screening_id = %screening_id, error = %e, "Could not refresh seat map after write");
            controller.availability().to_vec()
        }
    };

    controller.on_mutation_succeeded(fresh);
    Ok(())
}
