use orgkit_core::{
    models::{Membership, Role},
    AppError,
};
use sqlx::PgPool;
use uuid::Uuid;

const MEMBERSHIP_COLUMNS: &str = "id, organization_id, user_id, role, invitation_accepted, \
     invitation_token, invitation_sent_at, created_at";

/// Repository for membership records and role checks.
///
/// Role checks answer with a plain boolean: a missing membership is an
/// ordinary `false`, never an error, so callers can turn it into whatever
/// status fits their surface.
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn find(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let membership = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships \
             WHERE organization_id = $1 AND user_id = $2"
        ))
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Whether the user holds one of the given roles in the organization.
    /// Returns false when no membership exists.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn has_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        roles: &[Role],
    ) -> Result<bool, AppError> {
        let membership = self.find(organization_id, user_id).await?;

        Ok(membership.is_some_and(|m| roles.contains(&m.role)))
    }

    /// Whether the user belongs to the organization at all, regardless of role.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn has_access(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self.find(organization_id, user_id).await?.is_some())
    }

    /// Change a member's role.
    ///
    /// The current owner is untouchable: a membership whose role is OWNER can
    /// never be reassigned through this path, which also rules out ownership
    /// transfer. Whether the caller may assign the new role is the caller's
    /// check (see `Role::can_assign`).
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "update"))]
    pub async fn update_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        new_role: Role,
    ) -> Result<Membership, AppError> {
        let current = self
            .find(organization_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

        if current.role == Role::Owner {
            return Err(AppError::Forbidden(
                "The organization owner's role cannot be changed".to_string(),
            ));
        }

        // The write re-checks the owner guard so a role change racing this
        // update can never touch an OWNER row.
        let membership = sqlx::query_as::<_, Membership>(&format!(
            "UPDATE memberships SET role = $3 \
             WHERE organization_id = $1 AND user_id = $2 AND role <> 'OWNER' \
             RETURNING {MEMBERSHIP_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(user_id)
        .bind(new_role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("The organization owner's role cannot be changed".to_string())
        })?;

        tracing::info!(
            organization_id = %organization_id,
            user_id = %user_id,
            role = %new_role,
            "Updated member role"
        );
        Ok(membership)
    }

    /// Remove a member from the organization. The owner cannot be removed.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "delete"))]
    pub async fn remove(&self, organization_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let current = self
            .find(organization_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

        if current.role == Role::Owner {
            return Err(AppError::Forbidden(
                "The organization owner cannot be removed".to_string(),
            ));
        }

        let rows_affected = sqlx::query(
            "DELETE FROM memberships \
             WHERE organization_id = $1 AND user_id = $2 AND role <> 'OWNER'",
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::Forbidden(
                "The organization owner cannot be removed".to_string(),
            ));
        }

        tracing::info!(
            organization_id = %organization_id,
            user_id = %user_id,
            "Removed member"
        );
        Ok(())
    }
}
