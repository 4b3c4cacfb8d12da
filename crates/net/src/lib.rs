//! Cinema Network Library
//!
//! REST/JSON gateway to the cinema backend.
//!
//! # Architecture
//!
//! - **Client**: [`ApiClient`] wraps a cookie-aware HTTP client bound to one base URL
//! - **Wire**: payload types, decoded once into `cinema_core` models
//! - **Gateway**: `cinema_core` repository traits implemented on [`ApiClient`]
//!
//! # Usage
//!
//! ```ignore
//! let api = ApiClient::new("http://localhost:5000", DEFAULT_TIMEOUT)?;
//! let screening = api.get_screening(ScreeningId(3)).await?;
//! ```

pub mod client;
pub mod error;
mod gateway;
pub mod wire;

pub use client::ApiClient;
pub use error::{Error, Result};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
