//! Data models for the cinema client

mod account;
mod movie;
mod reservation;
mod screening;

pub use account::*;
pub use movie::*;
pub use reservation::*;
pub use screening::*;
