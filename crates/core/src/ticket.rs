//! Printable ticket for a reservation

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::models::{format_seat_numbers, Movie, Reservation, ReservationId, Screening};

const DATE_FORMAT: &str = "%d.%m.%Y";
const TIME_FORMAT: &str = "%H:%M";

/// Everything printed on a ticket, already formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub reservation_id: ReservationId,
    pub movie_title: String,
    pub date: String,
    pub time: String,
    pub seats: String,
    pub username: String,
}

impl Ticket {
    /// Screening and movie may be unknown; the ticket still prints
    pub fn new(
        reservation: &Reservation,
        screening: Option<&Screening>,
        movie: Option<&Movie>,
    ) -> Self {
        let (date, time) = match screening {
            Some(s) => (
                s.start_time.format(DATE_FORMAT).to_string(),
                s.start_time.format(TIME_FORMAT).to_string(),
            ),
            None => ("No data".to_string(), "No data".to_string()),
        };

        Self {
            reservation_id: reservation.id,
            movie_title: movie
                .map(|m| m.display_title().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            date,
            time,
            seats: format_seat_numbers(&reservation.seats),
            username: reservation.owner_username.clone(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("ticket-{}.txt", self.reservation_id)
    }

    pub fn render_text(&self) -> String {
        format!(
            "Cinema Ticket\n\n\
             Reservation ID: {}\n\
             Movie: {}\n\
             Date: {}\n\
             Time: {}\n\
             Seats: {}\n\
             Username: {}\n",
            self.reservation_id, self.movie_title, self.date, self.time, self.seats, self.username
        )
    }

    /// Write the ticket into `dir`, returning the file path
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.render_text())?;
        info!(reservation_id = %self.reservation_id, path = %path.display(), "Ticket saved");
        Ok(path)
    }
}
