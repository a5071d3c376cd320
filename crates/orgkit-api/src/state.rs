//! Application state and sub-state extractors.
//!
//! AppState is split so handlers can extract only what they need via Axum's
//! `FromRef` instead of threading a single god object everywhere.

use crate::services::email::EmailService;
use orgkit_core::Config;
use orgkit_db::{
    InvitationRepository, MembershipRepository, OrganizationRepository, UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Database pool and all repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub user_repository: UserRepository,
    pub organization_repository: OrganizationRepository,
    pub membership_repository: MembershipRepository,
    pub invitation_repository: InvitationRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            organization_repository: OrganizationRepository::new(pool.clone()),
            membership_repository: MembershipRepository::new(pool.clone()),
            invitation_repository: InvitationRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub config: Config,
    pub email: Option<EmailService>,
    pub is_production: bool,
}

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
