use super::conflict_on_unique;
use super::transaction::TransactionGuard;
use chrono::{DateTime, Utc};
use orgkit_core::{
    models::{
        Organization, OrganizationMember, OrganizationWithMembers, Role, UserOrganization,
        UserSummary,
    },
    AppError,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Partial update for an organization. The slug is immutable and deliberately
/// not representable here.
#[derive(Debug, Default, Clone)]
pub struct UpdateOrganizationFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub billing_email: Option<String>,
    pub billing_name: Option<String>,
    pub billing_address: Option<String>,
}

/// Row shape for member listings (membership joined to user projection).
#[derive(sqlx::FromRow)]
struct MemberRow {
    role: Role,
    invitation_accepted: bool,
    joined_at: DateTime<Utc>,
    user_id: Uuid,
    user_name: Option<String>,
    user_email: String,
    user_image: Option<String>,
}

impl From<MemberRow> for OrganizationMember {
    fn from(row: MemberRow) -> Self {
        OrganizationMember {
            role: row.role,
            invitation_accepted: row.invitation_accepted,
            joined_at: row.joined_at,
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                image: row.user_image,
            },
        }
    }
}

/// Row shape for a user's organization listing.
#[derive(sqlx::FromRow)]
struct UserOrganizationRow {
    #[sqlx(flatten)]
    organization: Organization,
    role: Role,
    invitation_accepted: bool,
    joined_at: DateTime<Utc>,
}

const ORGANIZATION_COLUMNS: &str = "id, name, slug, description, logo, billing_email, \
     billing_name, billing_address, created_by, created_at, updated_at";

/// Repository for organization lifecycle operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an organization and make the creator its owner.
    ///
    /// The three writes (organization insert, owner membership insert,
    /// default-organization assignment when the creator has none) are one
    /// atomic unit; concurrent readers never observe an organization without
    /// an owner. Slug availability is checked before insert; the unique
    /// constraint is the fallback for races and maps to a Conflict.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "insert"))]
    pub async fn create_organization(
        &self,
        name: &str,
        slug: &str,
        creator_id: Uuid,
        description: Option<&str>,
        logo: Option<&str>,
    ) -> Result<Organization, AppError> {
        if self.slug_exists(slug).await? {
            return Err(AppError::Conflict("Slug is already taken".to_string()));
        }

        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let organization = sqlx::query_as::<_, Organization>(&format!(
            "INSERT INTO organizations (name, slug, description, logo, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ORGANIZATION_COLUMNS}"
        ))
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(logo)
        .bind(creator_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Slug is already taken"))?;

        sqlx::query(
            "INSERT INTO memberships (organization_id, user_id, role, invitation_accepted) \
             VALUES ($1, $2, 'OWNER', TRUE)",
        )
        .bind(organization.id)
        .bind(creator_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "UPDATE users SET default_organization_id = $2, updated_at = NOW() \
             WHERE id = $1 AND default_organization_id IS NULL",
        )
        .bind(creator_id)
        .bind(organization.id)
        .execute(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            organization_id = %organization.id,
            slug = %organization.slug,
            creator_id = %creator_id,
            "Created organization"
        );
        Ok(organization)
    }

    /// Get an organization by id with its members.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select", db.record_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<OrganizationWithMembers>, AppError> {
        let organization = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match organization {
            Some(organization) => {
                let users = self.list_members(organization.id).await?;
                Ok(Some(OrganizationWithMembers {
                    organization,
                    users,
                }))
            }
            None => Ok(None),
        }
    }

    /// Get an organization by slug with its members.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    pub async fn get_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<OrganizationWithMembers>, AppError> {
        let organization = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        match organization {
            Some(organization) => {
                let users = self.list_members(organization.id).await?;
                Ok(Some(OrganizationWithMembers {
                    organization,
                    users,
                }))
            }
            None => Ok(None),
        }
    }

    /// List members of an organization joined to the minimal user projection,
    /// ordered by membership creation.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn list_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationMember>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT m.role, m.invitation_accepted, m.created_at AS joined_at, \
                    u.id AS user_id, u.name AS user_name, u.email AS user_email, u.image AS user_image \
             FROM memberships m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.organization_id = $1 \
             ORDER BY m.created_at ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrganizationMember::from).collect())
    }

    /// List the organizations a user belongs to, ordered by membership
    /// creation. The ordering is the tie-breaker for session-context
    /// resolution and must stay deterministic.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserOrganization>, AppError> {
        let rows = sqlx::query_as::<_, UserOrganizationRow>(
            "SELECT o.id, o.name, o.slug, o.description, o.logo, o.billing_email, \
                    o.billing_name, o.billing_address, o.created_by, o.created_at, o.updated_at, \
                    m.role, m.invitation_accepted, m.created_at AS joined_at \
             FROM memberships m \
             JOIN organizations o ON o.id = m.organization_id \
             WHERE m.user_id = $1 \
             ORDER BY m.created_at ASC, o.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserOrganization {
                organization: row.organization,
                role: row.role,
                invitation_accepted: row.invitation_accepted,
                joined_at: row.joined_at,
            })
            .collect())
    }

    /// Update mutable organization fields. The slug is never updatable.
    #[tracing::instrument(skip(self, fields), fields(db.table = "organizations", db.operation = "update", db.record_id = %id))]
    pub async fn update_organization(
        &self,
        id: Uuid,
        fields: UpdateOrganizationFields,
    ) -> Result<Organization, AppError> {
        let organization = sqlx::query_as::<_, Organization>(&format!(
            "UPDATE organizations SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                logo = COALESCE($4, logo), \
                billing_email = COALESCE($5, billing_email), \
                billing_name = COALESCE($6, billing_name), \
                billing_address = COALESCE($7, billing_address), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ORGANIZATION_COLUMNS}"
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.logo)
        .bind(fields.billing_email)
        .bind(fields.billing_name)
        .bind(fields.billing_address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        Ok(organization)
    }

    /// Delete an organization: clear dangling default-organization references,
    /// cascade memberships, and remove the organization, all in one
    /// transaction. Returns false if the organization did not exist.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_organization(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query(
            "UPDATE users SET default_organization_id = NULL, updated_at = NOW() \
             WHERE default_organization_id = $1",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM memberships WHERE organization_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        let rows_affected = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if rows_affected > 0 {
            tracing::info!(organization_id = %id, "Deleted organization");
        }
        Ok(rows_affected > 0)
    }

    /// Slug availability pre-check (primary path; the unique constraint is
    /// the race fallback).
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organizations WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
