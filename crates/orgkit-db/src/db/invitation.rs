use super::conflict_on_unique;
use super::transaction::TransactionGuard;
use chrono::{DateTime, Utc};
use orgkit_core::{
    models::{Membership, PendingInvitation, Role},
    AppError,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const MEMBERSHIP_COLUMNS: &str = "id, organization_id, user_id, role, invitation_accepted, \
     invitation_token, invitation_sent_at, created_at";

/// What an invitee sees when they open an invitation link: enough to decide,
/// nothing sensitive.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvitationDetails {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub organization_slug: String,
    pub email: String,
    pub role: Role,
    pub invitation_sent_at: Option<DateTime<Utc>>,
}

/// Repository for the invitation flow.
///
/// Invitations are memberships with `invitation_accepted = false` and a live
/// token. Inviting an unknown email creates a placeholder user so the
/// membership has a row to point at; the placeholder is promoted when that
/// person first authenticates.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending invitation for the given email.
    ///
    /// Finds or creates the invitee's user row, rejects duplicates (an
    /// existing membership in the organization, accepted or pending, is a
    /// Conflict), and records the token and send timestamp. The token itself
    /// is generated by the caller.
    #[tracing::instrument(skip(self, token), fields(db.table = "memberships", db.operation = "insert"))]
    pub async fn invite(
        &self,
        organization_id: Uuid,
        email: &str,
        role: Role,
        token: &str,
    ) -> Result<Membership, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?;

        let user_id = match existing {
            Some(id) => id,
            None => {
                // Placeholder name from the local part, like "jane" for
                // jane@example.com. Overwritten at first authentication.
                let placeholder_name = email.split('@').next().unwrap_or(email);
                sqlx::query_scalar(
                    "INSERT INTO users (email, name, kind) VALUES ($1, $2, 'invited') RETURNING id",
                )
                .bind(email)
                .bind(placeholder_name)
                .fetch_one(&mut **tx)
                .await?
            }
        };

        let already_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM memberships WHERE organization_id = $1 AND user_id = $2)",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        if already_member {
            return Err(AppError::Conflict(
                "User is already a member of this organization or has a pending invitation"
                    .to_string(),
            ));
        }

        let membership = sqlx::query_as::<_, Membership>(&format!(
            "INSERT INTO memberships \
                (organization_id, user_id, role, invitation_accepted, invitation_token, invitation_sent_at) \
             VALUES ($1, $2, $3, FALSE, $4, NOW()) \
             RETURNING {MEMBERSHIP_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .bind(token)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                "User is already a member of this organization or has a pending invitation",
            )
        })?;

        tx.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            user_id = %user_id,
            role = %role,
            "Created invitation"
        );
        Ok(membership)
    }

    /// Look up a pending invitation by its token.
    #[tracing::instrument(skip(self, token), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn find_by_token(&self, token: &str) -> Result<Option<InvitationDetails>, AppError> {
        let details = sqlx::query_as::<_, InvitationDetails>(
            "SELECT m.id, m.organization_id, o.name AS organization_name, \
                    o.slug AS organization_slug, u.email, m.role, m.invitation_sent_at \
             FROM memberships m \
             JOIN organizations o ON o.id = m.organization_id \
             JOIN users u ON u.id = m.user_id \
             WHERE m.invitation_token = $1 AND m.invitation_accepted = FALSE",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    /// Accept an invitation on behalf of an authenticated user.
    ///
    /// The token must reference a pending invitation (a spent or unknown token
    /// is NotFound, indistinguishable on purpose), and the membership must
    /// belong to the accepting user. Acceptance consumes the token and, if the
    /// user has no default organization yet, points it at this one.
    #[tracing::instrument(skip(self, token), fields(db.table = "memberships", db.operation = "update"))]
    pub async fn accept(&self, token: &str, user_id: Uuid) -> Result<Membership, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let pending = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships \
             WHERE invitation_token = $1 AND invitation_accepted = FALSE \
             FOR UPDATE"
        ))
        .bind(token)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

        if pending.user_id != user_id {
            return Err(AppError::Forbidden(
                "This invitation was issued to a different user".to_string(),
            ));
        }

        let membership = sqlx::query_as::<_, Membership>(&format!(
            "UPDATE memberships \
             SET invitation_accepted = TRUE, invitation_token = NULL \
             WHERE id = $1 \
             RETURNING {MEMBERSHIP_COLUMNS}"
        ))
        .bind(pending.id)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "UPDATE users SET default_organization_id = $2, updated_at = NOW() \
             WHERE id = $1 AND default_organization_id IS NULL",
        )
        .bind(user_id)
        .bind(membership.organization_id)
        .execute(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            organization_id = %membership.organization_id,
            user_id = %user_id,
            "Accepted invitation"
        );
        Ok(membership)
    }

    /// Cancel a pending invitation. Accepted memberships cannot be cancelled;
    /// removing an active member is a different operation.
    ///
    /// The row is locked for the check so a concurrent accept either commits
    /// first (cancel then fails with BadRequest) or waits and finds the row
    /// gone. The guard and the delete must never straddle an acceptance.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "delete", db.record_id = %invitation_id))]
    pub async fn cancel(
        &self,
        organization_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let membership = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships \
             WHERE id = $1 AND organization_id = $2 \
             FOR UPDATE"
        ))
        .bind(invitation_id)
        .bind(organization_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

        if membership.invitation_accepted {
            return Err(AppError::BadRequest(
                "Invitation has already been accepted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM memberships WHERE id = $1 AND invitation_accepted = FALSE")
            .bind(invitation_id)
            .execute(&mut **tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            invitation_id = %invitation_id,
            "Cancelled invitation"
        );
        Ok(())
    }

    /// List the pending invitations of an organization, oldest first.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn list_pending(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<PendingInvitation>, AppError> {
        let invitations = sqlx::query_as::<_, PendingInvitation>(
            "SELECT m.id, u.email, u.name, m.role, m.invitation_token AS token, \
                    m.invitation_sent_at, m.created_at \
             FROM memberships m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.organization_id = $1 AND m.invitation_accepted = FALSE \
             ORDER BY m.created_at ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invitations)
    }
}
