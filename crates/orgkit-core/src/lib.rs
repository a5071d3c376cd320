//! Orgkit core library
//!
//! Domain models, error types, configuration, and input validation shared by
//! the database and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
