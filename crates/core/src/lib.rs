//! Cinema Core Library
//!
//! Domain models, the seat selection state machine, backend repository
//! traits, ticket export, and the local session cache for the cinema client.

pub mod error;
pub mod invariants;
pub mod models;
pub mod repository;
pub mod selection;
pub mod session;
pub mod storage;
pub mod ticket;

pub use error::{Error, Result};
pub use models::*;
pub use repository::{
    AccountGateway, CinemaBackend, MovieRepository, ReservationRepository, ScreeningRepository,
};
pub use selection::{MutationMode, SeatSelectionController, SeatState, SeatView};
pub use session::{FixedSession, SessionProvider};
pub use storage::{CachedSession, Database, SessionCacheStore};
pub use ticket::Ticket;
