use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use orgkit_core::models::{Organization, Role, UserOrganization};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The caller's identity plus the organization context the session resolves
/// to, if any.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: SessionUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Pick the session's organization from the caller's accepted memberships:
/// the pinned organization from the token wins, then the stored default, then
/// the oldest membership. No memberships means no organization context, which
/// is a valid session state, not an error.
fn resolve_organization(
    auth: &AuthContext,
    memberships: Vec<UserOrganization>,
) -> Option<UserOrganization> {
    let accepted: Vec<UserOrganization> = memberships
        .into_iter()
        .filter(|m| m.invitation_accepted)
        .collect();

    if let Some(pinned) = auth.pinned_organization_id {
        if let Some(m) = accepted.iter().find(|m| m.organization.id == pinned) {
            return Some(m.clone());
        }
    }
    if let Some(default) = auth.default_organization_id {
        if let Some(m) = accepted.iter().find(|m| m.organization.id == default) {
            return Some(m.clone());
        }
    }
    accepted.into_iter().next()
}

#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses(
        (status = 200, description = "Session context", body = SessionResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, operation = "get_session"))]
pub async fn get_session(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let memberships = state
        .db
        .organization_repository
        .list_for_user(auth.user_id)
        .await?;

    let resolved = resolve_organization(&auth, memberships);

    Ok(Json(SessionResponse {
        user: SessionUser {
            id: auth.user_id,
            email: auth.email.clone(),
            name: auth.name.clone(),
        },
        organization: resolved.as_ref().map(|m| m.organization.clone()),
        role: resolved.as_ref().map(|m| m.role),
    }))
}
