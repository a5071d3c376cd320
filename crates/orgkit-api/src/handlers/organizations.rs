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
use orgkit_core::validation::{validate_organization_name, validate_slug};
use orgkit_core::AppError;
use orgkit_db::UpdateOrganizationFields;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    /// Display name
    #[schema(example = "Acme Inc")]
    #[validate(length(min = 2))]
    pub name: String,
    /// URL-safe identifier, immutable after creation
    #[schema(example = "acme")]
    #[validate(length(min = 2, max = 64))]
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 2))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    #[validate(email)]
    pub billing_email: Option<String>,
    pub billing_name: Option<String>,
    pub billing_address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetDefaultOrganizationRequest {
    pub organization_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/organizations",
    tag = "organizations",
    responses(
        (status = 200, description = "Caller's organizations", body = [orgkit_core::models::UserOrganization]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, operation = "list_organizations"))]
pub async fn list_organizations(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organizations = state
        .db
        .organization_repository
        .list_for_user(auth.user_id)
        .await?;

    Ok(Json(organizations))
}

#[utoipa::path(
    post,
    path = "/organizations",
    tag = "organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = orgkit_core::models::Organization),
        (status = 400, description = "Invalid name or slug", body = ErrorResponse),
        (status = 409, description = "Slug already taken", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %auth.user_id, slug = %request.slug, operation = "create_organization")
)]
pub async fn create_organization(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_organization_name(&request.name)?;
    validate_slug(&request.slug)?;

    let organization = state
        .db
        .organization_repository
        .create_organization(
            &request.name,
            &request.slug,
            auth.user_id,
            request.description.as_deref(),
            request.logo.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(organization)))
}

#[utoipa::path(
    get,
    path = "/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization with members", body = orgkit_core::models::OrganizationWithMembers),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, organization_id = %id, operation = "get_organization"))]
pub async fn get_organization(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = state
        .db
        .organization_repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    require_membership(&state.db, id, auth.user_id).await?;

    Ok(Json(organization))
}

#[utoipa::path(
    get,
    path = "/organizations/slug/{slug}",
    tag = "organizations",
    params(("slug" = String, Path, description = "Organization slug")),
    responses(
        (status = 200, description = "Organization with members", body = orgkit_core::models::OrganizationWithMembers),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, slug = %slug, operation = "get_organization_by_slug"))]
pub async fn get_organization_by_slug(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = state
        .db
        .organization_repository
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(Json(organization))
}

#[utoipa::path(
    patch,
    path = "/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Updated organization", body = orgkit_core::models::Organization),
        (status = 403, description = "Requires OWNER or ADMIN", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %auth.user_id, organization_id = %id, operation = "update_organization")
)]
pub async fn update_organization(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_role(&state.db, id, auth.user_id, &Role::MANAGERS).await?;

    if let Some(name) = &request.name {
        validate_organization_name(name)?;
    }

    let organization = state
        .db
        .organization_repository
        .update_organization(
            id,
            UpdateOrganizationFields {
                name: request.name,
                description: request.description,
                logo: request.logo,
                billing_email: request.billing_email,
                billing_name: request.billing_name,
                billing_address: request.billing_address,
            },
        )
        .await?;

    Ok(Json(organization))
}

#[utoipa::path(
    delete,
    path = "/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 403, description = "Requires OWNER", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, organization_id = %id, operation = "delete_organization"))]
pub async fn delete_organization(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_role(&state.db, id, auth.user_id, &[Role::Owner]).await?;

    let deleted = state
        .db
        .organization_repository
        .delete_organization(id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound("Organization not found".to_string()).into());
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/organizations/default",
    tag = "organizations",
    request_body = SetDefaultOrganizationRequest,
    responses(
        (status = 204, description = "Default organization set"),
        (status = 403, description = "Not a member of that organization", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %auth.user_id, operation = "set_default_organization")
)]
pub async fn set_default_organization(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SetDefaultOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization_id = request.organization_id;

    state
        .db
        .organization_repository
        .get_by_id(organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    require_membership(&state.db, organization_id, auth.user_id).await?;

    state
        .db
        .user_repository
        .set_default_organization(auth.user_id, organization_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
