use crate::auth::{generate_invitation_token, AuthContext};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::require_role;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use orgkit_core::models::Role;
use orgkit_core::validation::normalize_email;
use orgkit_core::AppError;
use orgkit_db::InvitationDetails;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteMemberRequest {
    #[schema(example = "bob@example.com")]
    #[validate(email)]
    pub email: String,
    pub role: Role,
}

/// What an invitee sees when opening an invitation link.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub organization_slug: String,
    pub email: String,
    pub role: Role,
    pub invitation_sent_at: Option<DateTime<Utc>>,
}

impl From<InvitationDetails> for InvitationResponse {
    fn from(details: InvitationDetails) -> Self {
        Self {
            id: details.id,
            organization_id: details.organization_id,
            organization_name: details.organization_name,
            organization_slug: details.organization_slug,
            email: details.email,
            role: details.role,
            invitation_sent_at: details.invitation_sent_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/organizations/{id}/users",
    tag = "invitations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = InviteMemberRequest,
    responses(
        (status = 201, description = "Invitation created", body = orgkit_core::models::Membership),
        (status = 403, description = "Insufficient role or elevation policy violated", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 409, description = "Already a member or already invited", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %auth.user_id, organization_id = %id, role = %request.role, operation = "invite_member")
)]
pub async fn invite_member(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<InviteMemberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = state
        .db
        .organization_repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    let caller = require_role(&state.db, id, auth.user_id, &Role::MANAGERS).await?;

    if !caller.role.can_assign(request.role) {
        return Err(AppError::Forbidden(format!(
            "A {} cannot invite with the {} role",
            caller.role, request.role
        ))
        .into());
    }

    let email = normalize_email(&request.email)?;
    let token = generate_invitation_token();

    let membership = state
        .db
        .invitation_repository
        .invite(id, &email, request.role, &token)
        .await?;

    // Delivery is best effort: the invitation row is the source of truth and
    // the token can still be shared out of band.
    if let Some(email_service) = state.email.clone() {
        let organization_name = organization.organization.name.clone();
        tokio::spawn(async move {
            if let Err(e) = email_service
                .send_invitation(&email, &organization_name, &token)
                .await
            {
                tracing::warn!(error = %e, "Failed to send invitation email");
            }
        });
    }

    Ok((StatusCode::CREATED, Json(membership)))
}

#[utoipa::path(
    get,
    path = "/organizations/invitations/{token}",
    tag = "invitations",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Pending invitation", body = InvitationResponse),
        (status = 404, description = "Unknown or already consumed token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, token), fields(user_id = %auth.user_id, operation = "view_invitation"))]
pub async fn view_invitation(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let details = state
        .db
        .invitation_repository
        .find_by_token(&token)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

    Ok(Json(InvitationResponse::from(details)))
}

#[utoipa::path(
    post,
    path = "/organizations/invitations/{token}",
    tag = "invitations",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Invitation accepted", body = orgkit_core::models::Membership),
        (status = 403, description = "Invitation addressed to a different user", body = ErrorResponse),
        (status = 404, description = "Unknown or already consumed token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, token), fields(user_id = %auth.user_id, operation = "accept_invitation"))]
pub async fn accept_invitation(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let membership = state
        .db
        .invitation_repository
        .accept(&token, auth.user_id)
        .await?;

    Ok(Json(membership))
}

#[utoipa::path(
    get,
    path = "/organizations/{id}/invitations",
    tag = "invitations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Pending invitations", body = [orgkit_core::models::PendingInvitation]),
        (status = 403, description = "Requires OWNER or ADMIN", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, organization_id = %id, operation = "list_invitations"))]
pub async fn list_invitations(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_role(&state.db, id, auth.user_id, &Role::MANAGERS).await?;

    let invitations = state.db.invitation_repository.list_pending(id).await?;
    Ok(Json(invitations))
}

#[utoipa::path(
    delete,
    path = "/organizations/{id}/invitations/{invitation_id}",
    tag = "invitations",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("invitation_id" = Uuid, Path, description = "Invitation (membership) ID")
    ),
    responses(
        (status = 204, description = "Invitation cancelled"),
        (status = 400, description = "Invitation already accepted", body = ErrorResponse),
        (status = 403, description = "Requires OWNER or ADMIN", body = ErrorResponse),
        (status = 404, description = "Invitation not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %auth.user_id, organization_id = %id, invitation_id = %invitation_id, operation = "cancel_invitation")
)]
pub async fn cancel_invitation(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path((id, invitation_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_role(&state.db, id, auth.user_id, &Role::MANAGERS).await?;

    state
        .db
        .invitation_repository
        .cancel(id, invitation_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
