//! SIGIL Server
//!
//! HTTP API for certificate issuance, verification, and revocation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod error;

pub use api::{AppState, router};
pub use error::ApiError;
