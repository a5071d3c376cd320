//! OpenAPI documentation.

use crate::error;
use crate::handlers;
use orgkit_core::models;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orgkit API",
        version = "0.1.0",
        description = "Organization membership and authorization service: organizations, \
                       role-based memberships (OWNER/ADMIN/MEMBER/GUEST), token-based \
                       invitations, and session context resolution."
    ),
    paths(
        // Organizations
        handlers::organizations::list_organizations,
        handlers::organizations::create_organization,
        handlers::organizations::get_organization,
        handlers::organizations::get_organization_by_slug,
        handlers::organizations::update_organization,
        handlers::organizations::delete_organization,
        handlers::organizations::set_default_organization,
        // Members
        handlers::members::list_members,
        handlers::members::update_member_role,
        handlers::members::remove_member,
        // Invitations
        handlers::invitations::invite_member,
        handlers::invitations::view_invitation,
        handlers::invitations::accept_invitation,
        handlers::invitations::list_invitations,
        handlers::invitations::cancel_invitation,
        // Session
        handlers::session::get_session,
    ),
    components(schemas(
        models::Role,
        models::Membership,
        models::PendingInvitation,
        models::Organization,
        models::OrganizationMember,
        models::OrganizationWithMembers,
        models::UserOrganization,
        models::UserSummary,
        handlers::organizations::CreateOrganizationRequest,
        handlers::organizations::UpdateOrganizationRequest,
        handlers::organizations::SetDefaultOrganizationRequest,
        handlers::members::UpdateRoleRequest,
        handlers::invitations::InviteMemberRequest,
        handlers::invitations::InvitationResponse,
        handlers::session::SessionUser,
        handlers::session::SessionResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "organizations", description = "Organization lifecycle"),
        (name = "members", description = "Membership administration"),
        (name = "invitations", description = "Invitation flow"),
        (name = "session", description = "Session context")
    )
)]
pub struct ApiDoc;

/// The OpenAPI spec served at /api/openapi.json.
pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
