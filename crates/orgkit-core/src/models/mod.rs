//! Domain models
//!
//! Entity structs shared across the workspace. The `sqlx` derives are gated
//! behind the `sqlx` feature so the models can be used without a database.

pub mod membership;
pub mod organization;
pub mod user;

pub use membership::{Membership, PendingInvitation, Role};
pub use organization::{
    Organization, OrganizationMember, OrganizationWithMembers, UserOrganization,
};
pub use user::{User, UserKind, UserSummary};
