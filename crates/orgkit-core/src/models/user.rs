use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// How a user record came to exist.
///
/// `Invited` users are placeholders created when an invitation is sent to an
/// email with no account yet; they are promoted to `Registered` when the
/// invitation is accepted by an authenticated caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_kind", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Registered,
    Invited,
}

/// User identity record.
///
/// Identity itself (credentials, token issuance) lives with the external auth
/// provider; this service only stores the profile and organization context.
/// Users are never deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub default_organization_id: Option<Uuid>,
    pub kind: UserKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal user projection embedded in organization member listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
}
