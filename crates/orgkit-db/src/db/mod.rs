//! Database repositories for data access layer
//!
//! Each repository owns one domain entity and provides its CRUD operations and
//! specialized queries. Multi-step writes (organization creation and deletion,
//! invitation acceptance) run inside a single transaction so partial
//! application is never observable.

pub mod invitation;
pub mod membership;
pub mod organization;
pub mod transaction;
pub mod user;

pub use invitation::{InvitationDetails, InvitationRepository};
pub use membership::MembershipRepository;
pub use organization::{OrganizationRepository, UpdateOrganizationFields};
pub use user::UserRepository;

use orgkit_core::AppError;

/// Map a storage-level unique-constraint violation to a Conflict error with
/// the given message; everything else passes through as a database error.
/// The pre-insert existence checks are the primary path; this is the safety
/// net that closes races between concurrent writers.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    if err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
    {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(err)
    }
}
