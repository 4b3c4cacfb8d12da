//! Error types for Cinema Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The screening or reservation a flow needs could not be resolved
    #[error("Missing context: {0}")]
    MissingContext(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("No seats selected")]
    EmptySelection,

    /// The backend refused a reservation mutation; the reason is kept verbatim
    #[error("{0}")]
    MutationRejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the user's in-progress selection should survive this failure
    pub fn preserves_selection(&self) -> bool {
        matches!(self, Error::MutationRejected(_) | Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
