//! Page view models
//!
//! Each page of the client is a small flow over the backend traits. Flows
//! hold no global state: the backend and the session are handed in.

mod auth;
mod movies;
mod reservation;
mod reservation_edit;
mod reservations;
mod screenings;

pub use auth::{AuthView, LOGIN_SUCCESS, REGISTER_SUCCESS};
pub use movies::MoviesView;
pub use reservation::{ReservationFlow, RESERVATION_SUCCESS};
pub use reservation_edit::{ReservationEditFlow, UPDATE_SUCCESS};
pub use reservations::ReservationsView;
pub use screenings::ScreeningsView;

use cinema_core::Error;

/// Pages a flow can send the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Movies,
    Screenings,
    Reservations,
    Login,
    Register,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Movies => "/movies",
            Route::Screenings => "/screenings",
            Route::Reservations => "/reservations",
            Route::Login => "/login",
            Route::Register => "/register",
        }
    }

    /// Where to go after `error`; `listing` is the page the flow was opened from.
    ///
    /// `None` means stay put: the user can fix the selection or retry.
    pub fn redirect_for(error: &Error, listing: Route) -> Option<Route> {
        match error {
            Error::MissingContext(_) => Some(listing),
            Error::NotAuthenticated => Some(Route::Login),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Text shown to the user for a failed action
pub fn failure_message(error: &Error) -> String {
    match error {
        Error::EmptySelection => "Select at least one seat.".to_string(),
        Error::NotAuthenticated => "Please log in first.".to_string(),
        Error::MutationRejected(reason) => reason.clone(),
        Error::Transport(detail) => format!("Could not reach the server ({detail}). Try again."),
        Error::Authentication(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirects() {
        let missing = Error::MissingContext("screening not available".into());
        assert_eq!(
            Route::redirect_for(&missing, Route::Screenings),
            Some(Route::Screenings)
        );
        assert_eq!(
            Route::redirect_for(&missing, Route::Reservations),
            Some(Route::Reservations)
        );
        assert_eq!(
            Route::redirect_for(&Error::NotAuthenticated, Route::Screenings),
            Some(Route::Login)
        );
    }

    #[test]
    fn test_recoverable_failures_stay() {
        for error in [
            Error::EmptySelection,
            Error::MutationRejected("seat taken".into()),
            Error::Transport("timeout".into()),
        ] {
            assert_eq!(Route::redirect_for(&error, Route::Screenings), None);
        }
    }

    #[test]
    fn test_rejection_reason_verbatim() {
        let message = failure_message(&Error::MutationRejected("seat taken".into()));
        assert_eq!(message, "seat taken");
    }
}
