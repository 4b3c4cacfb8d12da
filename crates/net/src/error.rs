//! Gateway error types

use cinema_core::Error as CoreError;

/// Gateway result type
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl Error {
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server understood the request and refused it
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Map a failed reservation write onto the core taxonomy.
    ///
    /// A 4xx means the backend arbitrated against us (seat taken, bad
    /// payload); its message is passed through untouched.
    pub fn into_mutation_error(self) -> CoreError {
        if self.is_client_error() {
            return CoreError::MutationRejected(self.into_message());
        }
        self.into()
    }

    /// Map a failed login or registration onto the core taxonomy
    pub fn into_auth_error(self) -> CoreError {
        if self.is_client_error() {
            return CoreError::Authentication(self.into_message());
        }
        self.into()
    }

    /// Server-provided text for a status error, the display form otherwise
    fn into_message(self) -> String {
        match self {
            Error::Status { message, .. } => message,
            other => other.to_string(),
        }
    }
}

impl From<Error> for CoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidUrl(url) => CoreError::Config(format!("invalid base URL '{}'", url)),
            other => CoreError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_message() {
        let err = Error::Status {
            status: 409,
            message: "Seat 4 is already reserved".into(),
        };
        match err.into_mutation_error() {
            CoreError::MutationRejected(reason) => {
                assert_eq!(reason, "Seat 4 is already reserved")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_client_error_status() {
        let err = Error::Status {
            status: 404,
            message: "Reservation not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert_eq!(Error::Decode("eof".into()).status(), None);
    }

    #[test]
    fn test_server_failure_is_transport() {
        let err = Error::Status {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert!(!err.is_client_error());
        assert!(matches!(err.into_mutation_error(), CoreError::Transport(_)));
    }

    #[test]
    fn test_decode_is_transport() {
        let err: CoreError = Error::Decode("expected array".into()).into();
        assert!(matches!(err, CoreError::Transport(_)));
    }

    #[test]
    fn test_auth_rejection() {
        let err = Error::Status {
            status: 401,
            message: "Invalid password".into(),
        };
        assert!(matches!(
            err.into_auth_error(),
            CoreError::Authentication(m) if m == "Invalid password"
        ));
    }
}
