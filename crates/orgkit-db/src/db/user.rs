use orgkit_core::{models::User, AppError};
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for user identity records.
///
/// Identity verification is the auth provider's job; this repository only
/// maintains the profile rows that memberships reference. Users are never
/// deleted here.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure a user row exists for a verified identity, creating it on first
    /// authentication. If the email already belongs to a placeholder created
    /// by an invitation, that row is promoted to `registered` and returned;
    /// the caller must treat the returned id as the effective user id.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "upsert"))]
    pub async fn ensure_user(
        &self,
        id: Uuid,
        email: &str,
        name: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, kind)
            VALUES ($1, $2, $3, 'registered')
            ON CONFLICT (email) DO UPDATE
            SET kind = 'registered',
                name = COALESCE(users.name, EXCLUDED.name),
                updated_at = NOW()
            RETURNING id, email, name, image, default_organization_id, kind, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, image, default_organization_id, kind, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, image, default_organization_id, kind, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Set the user's default organization. Access to the organization must be
    /// checked by the caller before this is invoked.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %user_id))]
    pub async fn set_default_organization(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<(), AppError> {
        let rows_affected = sqlx::query(
            "UPDATE users SET default_organization_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}
