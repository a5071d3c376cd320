use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::{require_membership, require_role};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use orgkit_core::models::Role;
use orgkit_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[utoipa::path(
    get,
    path = "/organizations/{id}/users",
    tag = "members",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization members", body = [orgkit_core::models::OrganizationMember]),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, organization_id = %id, operation = "list_members"))]
pub async fn list_members(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .db
        .organization_repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    require_membership(&state.db, id, auth.user_id).await?;

    let members = state.db.organization_repository.list_members(id).await?;
    Ok(Json(members))
}

#[utoipa::path(
    patch,
    path = "/organizations/{id}/users/{user_id}",
    tag = "members",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("user_id" = Uuid, Path, description = "Target user ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated membership", body = orgkit_core::models::Membership),
        (status = 403, description = "Insufficient role, or target is the owner", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %auth.user_id, organization_id = %id, target_user_id = %user_id, operation = "update_member_role")
)]
pub async fn update_member_role(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let caller = require_role(&state.db, id, auth.user_id, &Role::MANAGERS).await?;

    // Assigning a role follows the same elevation policy as inviting with it.
    if !caller.role.can_assign(request.role) {
        return Err(AppError::Forbidden(format!(
            "A {} cannot assign the {} role",
            caller.role, request.role
        ))
        .into());
    }

    let membership = state
        .db
        .membership_repository
        .update_role(id, user_id, request.role)
        .await?;

    Ok(Json(membership))
}

#[utoipa::path(
    delete,
    path = "/organizations/{id}/users/{user_id}",
    tag = "members",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("user_id" = Uuid, Path, description = "Target user ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Insufficient role, or target is the owner", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %auth.user_id, organization_id = %id, target_user_id = %user_id, operation = "remove_member")
)]
pub async fn remove_member(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_role(&state.db, id, auth.user_id, &Role::MANAGERS).await?;

    state.db.membership_repository.remove(id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
