use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Organization (tenant) entity.
///
/// The slug is URL-safe, globally unique, and immutable after creation; it is
/// never accepted as an updatable field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub billing_email: Option<String>,
    pub billing_name: Option<String>,
    pub billing_address: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member entry as embedded in organization detail responses:
/// the membership facts joined to the minimal user projection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationMember {
    pub role: super::Role,
    pub invitation_accepted: bool,
    pub joined_at: DateTime<Utc>,
    pub user: super::UserSummary,
}

/// Organization plus its members, the shape returned by the by-id and
/// by-slug lookups.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationWithMembers {
    #[serde(flatten)]
    pub organization: Organization,
    pub users: Vec<OrganizationMember>,
}

/// One entry in a user's organization listing: the organization and the
/// caller's own membership facts, ordered by membership creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserOrganization {
    pub organization: Organization,
    pub role: super::Role,
    pub invitation_accepted: bool,
    pub joined_at: DateTime<Utc>,
}
