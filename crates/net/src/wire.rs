//! Wire types for the cinema REST API
//!
//! Every payload is decoded here, once, into the canonical core models.
//! Field names follow the backend's JSON exactly.

use std::collections::BTreeSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime};
use cinema_core::{
    AccountType, Movie, MovieId, NewReservation, Reservation, ReservationId, ReservationUpdate,
    Screening, ScreeningId, SeatIndex,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct MovieDto {
    #[serde(rename = "movieID")]
    pub movie_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub actors: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    /// Base64 JPEG, optionally as a full data URL
    #[serde(default)]
    pub poster: Option<String>,
}

impl MovieDto {
    pub fn into_model(self) -> Movie {
        let poster = self.poster.as_deref().and_then(|p| {
            decode_poster(p)
                .map_err(|e| warn!(movie_id = self.movie_id, error = %e, "Dropping undecodable poster"))
                .ok()
        });

        Movie {
            id: MovieId(self.movie_id),
            title: self.title.unwrap_or_default(),
            director: self.director.unwrap_or_default(),
            actors: self.actors.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            poster,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningDto {
    #[serde(rename = "screeningID")]
    pub screening_id: i64,
    #[serde(rename = "movieID")]
    pub movie_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub available_seats: Vec<bool>,
}

impl ScreeningDto {
    pub fn into_model(self) -> Result<Screening> {
        Ok(Screening {
            id: ScreeningId(self.screening_id),
            movie_id: MovieId(self.movie_id),
            start_time: parse_timestamp(&self.start_time)?,
            end_time: parse_timestamp(&self.end_time)?,
            available_seats: self.available_seats,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub reservation_id: i64,
    pub screening_id: i64,
    pub username: String,
    #[serde(default)]
    pub seats: Option<Vec<SeatIndex>>,
}

impl ReservationDto {
    pub fn into_model(self) -> Reservation {
        Reservation {
            id: ReservationId(self.reservation_id),
            screening_id: ScreeningId(self.screening_id),
            owner_username: self.username,
            seats: self.seats.unwrap_or_default().into_iter().collect(),
        }
    }
}

/// Body of both create and update requests
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationWriteDto<'a> {
    pub screening_id: i64,
    pub account_username: &'a str,
    pub reserved_seats: Vec<SeatIndex>,
}

impl<'a> ReservationWriteDto<'a> {
    pub fn for_create(reservation: &'a NewReservation) -> Self {
        Self::new(
            reservation.screening_id,
            &reservation.owner_username,
            &reservation.seats,
        )
    }

    pub fn for_update(update: &'a ReservationUpdate) -> Self {
        Self::new(update.screening_id, &update.owner_username, &update.seats)
    }

    fn new(screening_id: ScreeningId, username: &'a str, seats: &BTreeSet<SeatIndex>) -> Self {
        Self {
            screening_id: screening_id.0,
            account_username: username,
            reserved_seats: seats.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReservationDto {
    pub reservation_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginRequestDto<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequestDto<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(rename = "type")]
    pub account_type: &'a str,
}

/// Answer to login and registration
#[derive(Debug, Deserialize)]
pub struct AccountResponseDto {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}

impl AccountResponseDto {
    pub fn account_type(&self) -> AccountType {
        self.account_type
            .as_deref()
            .map(AccountType::from_str_lossy)
            .unwrap_or_default()
    }
}

/// Decode a list, converting each element into its model
pub fn decode_screenings(body: &[u8]) -> Result<Vec<Screening>> {
    let dtos: Vec<ScreeningDto> = decode(body)?;
    dtos.into_iter().map(ScreeningDto::into_model).collect()
}

pub fn decode<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))
}

/// Backend timestamps arrive with or without an offset; either way the
/// cinema's local wall-clock time is kept
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|_| Error::Decode(format!("invalid timestamp '{}'", s)))
}

fn decode_poster(poster: &str) -> Result<Vec<u8>> {
    let encoded = match poster.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| Error::Decode("data URL without payload".into()))?,
        None => poster,
    };

    STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Decode(format!("poster: {}", e)))
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers with `{"message": ...}`, problem details
/// (`title`/`detail`), or plain text.
pub fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(body) {
        for key in ["message", "detail", "title"] {
            if let Some(serde_json::Value::String(text)) = map.get(key) {
                if !text.trim().is_empty() {
                    return text.clone();
                }
            }
        }
    }

    let text = body.trim();
    if text.is_empty() || text.starts_with('{') {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_screening_decode() {
        let body = json!([{
            "screeningID": 4,
            "movieID": 2,
            "startTime": "2025-06-01T18:00:00",
            "endTime": "2025-06-01T20:15:00",
            "availableSeats": [true, false, true]
        }])
        .to_string();

        let screenings = decode_screenings(body.as_bytes()).unwrap();
        assert_eq!(screenings.len(), 1);
        assert_eq!(screenings[0].id, ScreeningId(4));
        assert_eq!(screenings[0].available_seats, vec![true, false, true]);
        assert_eq!(
            screenings[0].start_time.format("%H:%M").to_string(),
            "18:00"
        );
    }

    #[test]
    fn test_wrapped_seat_list_rejected() {
        let body = json!([{
            "screeningID": 4,
            "movieID": 2,
            "startTime": "2025-06-01T18:00:00",
            "endTime": "2025-06-01T20:15:00",
            "availableSeats": {"$values": [true]}
        }])
        .to_string();

        assert!(matches!(
            decode_screenings(body.as_bytes()),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2025-06-01T18:00:00").is_ok());
        assert!(parse_timestamp("2025-06-01T18:00:00.1234567").is_ok());
        assert!(parse_timestamp("2025-06-01T18:00").is_ok());

        let with_offset = parse_timestamp("2025-06-01T18:00:00+02:00").unwrap();
        assert_eq!(with_offset.format("%H:%M").to_string(), "18:00");

        assert!(parse_timestamp("June 1st").is_err());
    }

    #[test]
    fn test_reservation_null_seats() {
        let dto: ReservationDto = decode(
            json!({"reservationId": 1, "screeningId": 2, "username": "anna", "seats": null})
                .to_string()
                .as_bytes(),
        )
        .unwrap();
        assert!(dto.into_model().seats.is_empty());
    }

    #[test]
    fn test_negative_seat_rejected() {
        let result: Result<ReservationDto> = decode(
            json!({"reservationId": 1, "screeningId": 2, "username": "anna", "seats": [-1]})
                .to_string()
                .as_bytes(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_write_body_shape() {
        let new = NewReservation {
            screening_id: ScreeningId(8),
            owner_username: "anna".into(),
            seats: [5, 1].into_iter().collect(),
        };
        let body = serde_json::to_value(ReservationWriteDto::for_create(&new)).unwrap();
        assert_eq!(
            body,
            json!({"screeningId": 8, "accountUsername": "anna", "reservedSeats": [1, 5]})
        );
    }

    #[test]
    fn test_poster_variants() {
        let movie = MovieDto {
            movie_id: 1,
            title: Some("Alien".into()),
            director: None,
            actors: None,
            description: None,
            poster: Some("data:image/jpeg;base64,/9j/".into()),
        }
        .into_model();
        assert_eq!(movie.poster, Some(vec![0xff, 0xd8, 0xff]));

        let movie = MovieDto {
            movie_id: 1,
            title: None,
            director: None,
            actors: None,
            description: None,
            poster: Some("not base64!".into()),
        }
        .into_model();
        assert!(movie.poster.is_none());
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(error_message(r#"{"message":"Seat taken"}"#, "x"), "Seat taken");
        assert_eq!(
            error_message(r#"{"title":"Bad Request","status":400}"#, "x"),
            "Bad Request"
        );
        assert_eq!(error_message("plain failure", "x"), "plain failure");
        assert_eq!(error_message("", "Conflict"), "Conflict");
    }
}
