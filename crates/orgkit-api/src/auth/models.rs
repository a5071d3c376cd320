use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims issued by the identity provider.
///
/// Identity verification is the provider's job; this service only checks the
/// signature and expiry, then layers organization context on top. The optional
/// `org` claim pins the session to a specific organization and takes
/// precedence over the user's stored default.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the provider's stable user id.
    pub sub: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Organization the session is pinned to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated caller, extracted from the JWT and the user record, stored in
/// request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub default_organization_id: Option<Uuid>,
    pub pinned_organization_id: Option<Uuid>,
}

// Extracted from request parts so handlers can take AuthContext as a plain
// argument alongside Path/Json extractors.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "Missing authentication context",
                    "UNAUTHORIZED",
                )),
            )
        })
    }
}
