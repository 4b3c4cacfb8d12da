//! Seat selection state machine
//!
//! One controller lives for one visit to a screening's seat map, either
//! building a new reservation or editing an existing one. It never touches
//! the network: callers load the context, feed seat clicks through
//! [`SeatSelectionController::toggle`], turn the selection into a
//! [`ReservationMutation`], and report the backend's answer back.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::invariants::assert_selection_invariants;
use crate::models::{
    seat_number, Identity, NewReservation, Reservation, ReservationId, ReservationMutation,
    ReservationUpdate, Screening, ScreeningId, SeatIndex,
};

/// Which write the selection should become
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    Create,
    Update,
}

/// How a seat should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    /// Free for anyone
    Free,
    /// Held by another reservation
    Taken,
    /// Held by the reservation under edit
    Mine,
}

/// One seat in the rendered seat map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatView {
    pub index: SeatIndex,
    /// 1-based number shown to users
    pub number: usize,
    pub state: SeatState,
    pub selected: bool,
}

impl SeatView {
    pub fn is_selectable(&self) -> bool {
        self.state != SeatState::Taken
    }
}

/// Selection state for one screening visit
#[derive(Debug, Clone)]
pub struct SeatSelectionController {
    screening_id: ScreeningId,
    editing: Option<ReservationId>,
    availability: Vec<bool>,
    committed: BTreeSet<SeatIndex>,
    selected: BTreeSet<SeatIndex>,
}

impl SeatSelectionController {
    /// Start from raw parts. `selected` begins as a copy of `committed`.
    ///
    /// Committed seats only make sense for a reservation under edit.
    pub fn initialize(
        screening_id: ScreeningId,
        availability: Vec<bool>,
        committed: BTreeSet<SeatIndex>,
        editing: Option<ReservationId>,
    ) -> Result<Self> {
        if !committed.is_empty() && editing.is_none() {
            return Err(Error::MissingContext(format!(
                "screening {} has committed seats but no reservation under edit",
                screening_id
            )));
        }

        let controller = Self {
            screening_id,
            editing,
            availability,
            selected: committed.clone(),
            committed,
        };
        assert_selection_invariants(&controller);
        debug!(
            screening_id = %screening_id,
            seat_count = controller.availability.len(),
            committed = controller.committed.len(),
            "Seat selection initialized"
        );
        Ok(controller)
    }

    /// Controller for booking new seats at a screening
    pub fn for_new_reservation(screening: Option<&Screening>) -> Result<Self> {
        let screening = screening
            .ok_or_else(|| Error::MissingContext("screening not available".into()))?;

        Self::initialize(
            screening.id,
            screening.available_seats.clone(),
            BTreeSet::new(),
            None,
        )
    }

    /// Controller for changing the seats of an existing reservation
    pub fn for_existing_reservation(
        screening: Option<&Screening>,
        reservation: Option<&Reservation>,
    ) -> Result<Self> {
        let screening = screening
            .ok_or_else(|| Error::MissingContext("screening not available".into()))?;
        let reservation = reservation
            .ok_or_else(|| Error::MissingContext("reservation not available".into()))?;

        if reservation.screening_id != screening.id {
            return Err(Error::MissingContext(format!(
                "reservation {} belongs to screening {}, not {}",
                reservation.id, reservation.screening_id, screening.id
            )));
        }

        Self::initialize(
            screening.id,
            screening.available_seats.clone(),
            reservation.seats.clone(),
            Some(reservation.id),
        )
    }

    pub fn screening_id(&self) -> ScreeningId {
        self.screening_id
    }

    /// Reservation under edit, if this is an edit flow
    pub fn editing(&self) -> Option<ReservationId> {
        self.editing
    }

    pub fn availability(&self) -> &[bool] {
        &self.availability
    }

    pub fn committed_seats(&self) -> &BTreeSet<SeatIndex> {
        &self.committed
    }

    /// Current working selection, ascending
    pub fn selected_seats(&self) -> &BTreeSet<SeatIndex> {
        &self.selected
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, index: SeatIndex) -> bool {
        self.selected.contains(&index)
    }

    /// Whether the reserve/save action should be enabled
    pub fn can_submit(&self) -> bool {
        !self.selected.is_empty()
    }

    /// A seat may be clicked if it is on the map and either free or already ours
    pub fn is_selectable(&self, index: SeatIndex) -> bool {
        match self.availability.get(index) {
            Some(free) => *free || self.committed.contains(&index),
            None => false,
        }
    }

    /// Flip a seat in or out of the selection. Unselectable seats are ignored.
    pub fn toggle(&mut self, index: SeatIndex) {
        if !self.is_selectable(index) {
            debug!(index, "Ignoring click on unselectable seat");
            return;
        }

        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }

        assert_selection_invariants(self);
    }

    pub fn seat_state(&self, index: SeatIndex) -> SeatState {
        let free = self.availability.get(index).copied().unwrap_or(false);
        if free {
            SeatState::Free
        } else if self.committed.contains(&index) {
            SeatState::Mine
        } else {
            SeatState::Taken
        }
    }

    /// Every seat on the map with its drawing state
    pub fn seat_map(&self) -> Vec<SeatView> {
        (0..self.availability.len())
            .map(|index| SeatView {
                index,
                number: seat_number(index),
                state: self.seat_state(index),
                selected: self.selected.contains(&index),
            })
            .collect()
    }

    /// Project the current selection into a reservation write.
    ///
    /// Reads the selection as it is right now; nothing here suspends.
    pub fn build_mutation_request(
        &self,
        mode: MutationMode,
        identity: Option<&Identity>,
    ) -> Result<ReservationMutation> {
        if !self.can_submit() {
            return Err(Error::EmptySelection);
        }

        let identity = identity.ok_or(Error::NotAuthenticated)?;
        let seats = self.selected.clone();

        match mode {
            MutationMode::Create => Ok(ReservationMutation::Create(NewReservation {
                screening_id: self.screening_id,
                owner_username: identity.username.clone(),
                seats,
            })),
            MutationMode::Update => {
                let reservation_id = self.editing.ok_or_else(|| {
                    Error::MissingContext("no reservation is being edited".into())
                })?;
                Ok(ReservationMutation::Update(ReservationUpdate {
                    reservation_id,
                    screening_id: self.screening_id,
                    owner_username: identity.username.clone(),
                    seats,
                }))
            }
        }
    }

    /// Adopt the backend's post-write seat map and start over with nothing selected
    pub fn on_mutation_succeeded(&mut self, fresh_availability: Vec<bool>) {
        debug!(
            screening_id = %self.screening_id,
            seat_count = fresh_availability.len(),
            "Mutation succeeded, adopting fresh availability"
        );
        self.availability = fresh_availability;
        self.selected.clear();
        self.committed.clear();
        self.editing = None;
        assert_selection_invariants(self);
    }

    /// Keep everything as it is and hand the failure back for display
    pub fn on_mutation_failed(&self, failure: Error) -> Error {
        warn!(
            screening_id = %self.screening_id,
            selected = self.selected.len(),
            error = %failure,
            retryable = failure.preserves_selection(),
            "Mutation failed, selection preserved"
        );
        failure
    }
}
