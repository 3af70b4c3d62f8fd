//! HTTP control plane for the re-hosting pipeline.
//!
//! This crate exposes the upload backend over a small JSON API:
//! - Asset re-hosting (fetch a source URL, publish, return the durable URL)
//! - Aggregate asset statistics
//! - Health checking

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
