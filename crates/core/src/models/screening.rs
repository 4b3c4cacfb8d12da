//! Screening model

use chrono::NaiveDateTime;

use super::MovieId;

/// Zero-based position in a screening's seat sequence; the only seat identifier
pub type SeatIndex = usize;

/// Backend identifier of a screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreeningId(pub i64);

impl std::fmt::Display for ScreeningId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One showing of a movie in a fixed time slot
#[derive(Debug, Clone, PartialEq)]
pub struct Screening {
    pub id: ScreeningId,
    pub movie_id: MovieId,
    /// Local cinema time
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// `true` = free. Snapshot, authoritative only until the next refresh.
    pub available_seats: Vec<bool>,
}

impl Screening {
    pub fn seat_count(&self) -> usize {
        self.available_seats.len()
    }

    pub fn free_seat_count(&self) -> usize {
        self.available_seats.iter().filter(|free| **free).count()
    }

    pub fn is_free(&self, index: SeatIndex) -> bool {
        self.available_seats.get(index).copied().unwrap_or(false)
    }
}

/// Seat number shown to users (1-based)
pub fn seat_number(index: SeatIndex) -> usize {
    index + 1
}

/// Inverse of [`seat_number`]; `None` for seat number 0
pub fn seat_index(number: usize) -> Option<SeatIndex> {
    number.checked_sub(1)
}
