//! Domain route groups (organizations, members, invitations, session).

use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use std::sync::Arc;

/// Everything behind the auth middleware.
pub fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    organization_routes(state.clone())
        .merge(member_routes(state.clone()))
        .merge(invitation_routes(state.clone()))
        .merge(session_routes(state))
}

fn organization_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/organizations",
            get(handlers::organizations::list_organizations)
                .post(handlers::organizations::create_organization),
        )
        // Registered before /organizations/{id} so "default" and "slug" are
        // never parsed as organization ids.
        .route(
            "/organizations/default",
            post(handlers::organizations::set_default_organization),
        )
        .route(
            "/organizations/slug/{slug}",
            get(handlers::organizations::get_organization_by_slug),
        )
        .route(
            "/organizations/{id}",
            get(handlers::organizations::get_organization)
                .patch(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .with_state(state)
}

fn member_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/organizations/{id}/users",
            get(handlers::members::list_members).post(handlers::invitations::invite_member),
        )
        .route(
            "/organizations/{id}/users/{user_id}",
            patch(handlers::members::update_member_role).delete(handlers::members::remove_member),
        )
        .with_state(state)
}

fn invitation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/organizations/invitations/{token}",
            get(handlers::invitations::view_invitation)
                .post(handlers::invitations::accept_invitation),
        )
        .route(
            "/organizations/{id}/invitations",
            get(handlers::invitations::list_invitations),
        )
        .route(
            "/organizations/{id}/invitations/{invitation_id}",
            delete(handlers::invitations::cancel_invitation),
        )
        .with_state(state)
}

fn session_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(handlers::session::get_session))
        .with_state(state)
}
