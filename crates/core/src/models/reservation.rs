//! Reservation models and mutation payloads

use std::collections::BTreeSet;

use super::{seat_number, ScreeningId, SeatIndex};

/// Backend identifier of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReservationId(pub i64);

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's booking for a screening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub screening_id: ScreeningId,
    pub owner_username: String,
    pub seats: BTreeSet<SeatIndex>,
}

impl Reservation {
    /// Seat numbers as shown to users, ascending
    pub fn seat_numbers(&self) -> Vec<usize> {
        self.seats.iter().map(|i| seat_number(*i)).collect()
    }

    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner_username == username
    }
}

/// Payload for creating a reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub screening_id: ScreeningId,
    pub owner_username: String,
    pub seats: BTreeSet<SeatIndex>,
}

/// Payload for replacing the seats of an existing reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationUpdate {
    pub reservation_id: ReservationId,
    pub screening_id: ScreeningId,
    pub owner_username: String,
    pub seats: BTreeSet<SeatIndex>,
}

/// A reservation write produced from a seat selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationMutation {
    Create(NewReservation),
    Update(ReservationUpdate),
}

impl ReservationMutation {
    pub fn screening_id(&self) -> ScreeningId {
        match self {
            ReservationMutation::Create(r) => r.screening_id,
            ReservationMutation::Update(r) => r.screening_id,
        }
    }

    pub fn seats(&self) -> &BTreeSet<SeatIndex> {
        match self {
            ReservationMutation::Create(r) => &r.seats,
            ReservationMutation::Update(r) => &r.seats,
        }
    }

    pub fn owner_username(&self) -> &str {
        match self {
            ReservationMutation::Create(r) => &r.owner_username,
            ReservationMutation::Update(r) => &r.owner_username,
        }
    }
}

/// Formats seat numbers the way listings and tickets show them: "1, 4, 5"
pub fn format_seat_numbers(seats: &BTreeSet<SeatIndex>) -> String {
    seats
        .iter()
        .map(|i| seat_number(*i).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
