//! Orgkit API Library
//!
//! HTTP handlers, middleware, and application setup for the organization
//! membership and authorization service.

mod api_doc;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use error::ErrorResponse;
