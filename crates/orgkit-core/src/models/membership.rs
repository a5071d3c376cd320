use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role a user holds within an organization, ordered by privilege.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "organization_role", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Admin,
    Member,
    Guest,
}

impl Role {
    /// All roles, highest privilege first.
    pub const ALL: [Role; 4] = [Role::Owner, Role::Admin, Role::Member, Role::Guest];

    /// Roles allowed to manage members and invitations.
    pub const MANAGERS: [Role; 2] = [Role::Owner, Role::Admin];

    /// Whether a holder of this role may grant `target` to someone else.
    ///
    /// Owners may grant any role, admins any role below owner, and members
    /// and guests may grant nothing (they cannot invite at all).
    pub fn can_assign(&self, target: Role) -> bool {
        match self {
            Role::Owner => true,
            Role::Admin => target != Role::Owner,
            Role::Member | Role::Guest => false,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Owner => write!(f, "OWNER"),
            Role::Admin => write!(f, "ADMIN"),
            Role::Member => write!(f, "MEMBER"),
            Role::Guest => write!(f, "GUEST"),
        }
    }
}

/// Membership joining a user to an organization.
///
/// A membership is created either accepted (organization creation makes the
/// creator an owner) or pending (invitation: `invitation_accepted = false`
/// with a secret token). Accepting clears the token; a cleared token never
/// resolves again. The `(organization_id, user_id)` pair is the natural key,
/// enforced by a database unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Membership {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub invitation_accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_token: Option<String>,
    pub invitation_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// A pending invitation: not yet accepted and still redeemable.
    pub fn is_pending(&self) -> bool {
        !self.invitation_accepted && self.invitation_token.is_some()
    }
}

/// A pending invitation as listed for organization admins: the membership id
/// (used for cancellation), the invited user's profile, and the token so the
/// UI can surface the invitation link.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PendingInvitation {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub token: String,
    pub invitation_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_can_assign_every_role() {
        for role in Role::ALL {
            assert!(Role::Owner.can_assign(role));
        }
    }

    #[test]
    fn admin_cannot_assign_owner() {
        assert!(!Role::Admin.can_assign(Role::Owner));
        assert!(Role::Admin.can_assign(Role::Admin));
        assert!(Role::Admin.can_assign(Role::Member));
        assert!(Role::Admin.can_assign(Role::Guest));
    }

    #[test]
    fn members_and_guests_assign_nothing() {
        for role in Role::ALL {
            assert!(!Role::Member.can_assign(role));
            assert!(!Role::Guest.can_assign(role));
        }
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"OWNER\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"MEMBER\"").unwrap(),
            Role::Member
        );
    }

    #[test]
    fn pending_requires_token_and_not_accepted() {
        let now = Utc::now();
        let mut m = Membership {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role: Role::Member,
            invitation_accepted: false,
            invitation_token: Some("deadbeef".to_string()),
            invitation_sent_at: Some(now),
            created_at: now,
        };
        assert!(m.is_pending());

        m.invitation_accepted = true;
        m.invitation_token = None;
        assert!(!m.is_pending());
    }
}
