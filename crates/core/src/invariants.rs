//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::models::ReservationMutation;
use crate::selection::SeatSelectionController;

/// Every selected seat must be free or already belong to the reservation under edit
pub fn assert_selection_invariants(controller: &SeatSelectionController) {
    for index in controller.selected_seats() {
        let free = controller
            .availability()
            .get(*index)
            .copied()
            .unwrap_or(false);
        debug_assert!(
            free || controller.committed_seats().contains(index),
            "Seat {} selected for screening {} but neither free nor committed",
            index,
            controller.screening_id()
        );
    }

    // Committed seats only exist while editing
    debug_assert!(
        controller.committed_seats().is_empty() || controller.editing().is_some(),
        "Screening {} has committed seats without a reservation under edit",
        controller.screening_id()
    );
}

/// A mutation leaving the client must name an owner and at least one seat
pub fn assert_mutation_invariants(mutation: &ReservationMutation) {
    debug_assert!(
        !mutation.seats().is_empty(),
        "Mutation for screening {} carries no seats",
        mutation.screening_id()
    );

    debug_assert!(
        !mutation.owner_username().trim().is_empty(),
        "Mutation for screening {} has empty owner",
        mutation.screening_id()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewReservation, ReservationId, ScreeningId};
    use std::collections::BTreeSet;

    #[test]
    fn test_valid_selection() {
        let controller = SeatSelectionController::initialize(
            ScreeningId(1),
            vec![false, true],
            [0].into_iter().collect(),
            Some(ReservationId(2)),
        )
        .unwrap();
        assert_selection_invariants(&controller);
    }

    #[test]
    fn test_valid_mutation() {
        let mutation = ReservationMutation::Create(NewReservation {
            screening_id: ScreeningId(1),
            owner_username: "anna".to_string(),
            seats: [3].into_iter().collect(),
        });
        assert_mutation_invariants(&mutation);
    }

    #[test]
    #[should_panic(expected = "carries no seats")]
    fn test_mutation_without_seats() {
        let mutation = ReservationMutation::Create(NewReservation {
            screening_id: ScreeningId(1),
            owner_username: "anna".to_string(),
            seats: BTreeSet::new(),
        });
        assert_mutation_invariants(&mutation);
    }
}
