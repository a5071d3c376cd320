//! HTTP handlers.
//!
//! Authorization is uniform: unauthenticated requests never reach a handler
//! (the auth middleware answers 401), so a failed membership or role check in
//! here is always a 403.

pub mod invitations;
pub mod members;
pub mod organizations;
pub mod session;

use crate::state::DbState;
use orgkit_core::models::{Membership, Role};
use orgkit_core::AppError;
use uuid::Uuid;

/// Fetch the caller's membership in the organization and check it against the
/// allowed roles. Absent membership and insufficient role both come back as
/// Forbidden; the caller is authenticated, so 401 is never right here.
pub(crate) async fn require_role(
    db: &DbState,
    organization_id: Uuid,
    user_id: Uuid,
    roles: &[Role],
) -> Result<Membership, AppError> {
    let membership = db
        .membership_repository
        .find(organization_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("You are not a member of this organization".to_string())
        })?;

    if !roles.contains(&membership.role) {
        return Err(AppError::Forbidden(
            "Your role does not permit this action".to_string(),
        ));
    }

    Ok(membership)
}

/// Membership with any role is enough.
pub(crate) async fn require_membership(
    db: &DbState,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Membership, AppError> {
    require_role(db, organization_id, user_id, &Role::ALL).await
}
