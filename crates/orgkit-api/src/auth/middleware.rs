use crate::auth::models::{AuthContext, JwtClaims};
use crate::error::HttpAppError;
use crate::utils::ip::extract_client_ip;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use orgkit_core::AppError;
use orgkit_db::UserRepository;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Per-IP failed-authentication counter with a sliding reset window.
#[derive(Clone)]
pub struct AuthFailureLimiter {
    inner: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
    max_failures: u32,
    window: Duration,
}

impl AuthFailureLimiter {
    pub fn new(max_failures: u32, window_seconds: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window: Duration::from_secs(window_seconds),
        }
    }

    pub async fn record_failure(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let now = Instant::now();
        let (count, reset_at) = guard.entry(ip.to_string()).or_insert((0, now + self.window));
        if now >= *reset_at {
            *count = 0;
            *reset_at = now + self.window;
        }
        *count += 1;
        *count >= self.max_failures
    }

    pub async fn is_blocked(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        if let Some((count, reset_at)) = guard.get(ip) {
            if Instant::now() >= *reset_at {
                guard.remove(ip);
                return false;
            }
            return *count >= self.max_failures;
        }
        false
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub decoding_key: DecodingKey,
    pub user_repository: UserRepository,
    pub auth_failure_limiter: Option<Arc<AuthFailureLimiter>>,
}

impl AuthState {
    pub fn new(
        jwt_secret: &str,
        user_repository: UserRepository,
        auth_failure_limiter: Option<Arc<AuthFailureLimiter>>,
    ) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            user_repository,
            auth_failure_limiter,
        }
    }
}

fn too_many_failures() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, "Too many failed auth attempts").into_response()
}

/// Verify the bearer JWT, sync the user record, and attach [`AuthContext`] to
/// the request.
///
/// The subject id from the token is advisory: if the email already belongs to
/// an invitation placeholder, the placeholder row's id is the effective user
/// id from here on. Handlers must only ever read identity from AuthContext.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let trusted_proxy_count = std::env::var("TRUSTED_PROXY_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);
    let socket_addr = request.extensions().get::<std::net::SocketAddr>().copied();
    let client_ip = extract_client_ip(request.headers(), socket_addr.as_ref(), trusted_proxy_count);

    if let Some(ref limiter) = auth_state.auth_failure_limiter {
        if limiter.is_blocked(&client_ip).await {
            return too_many_failures();
        }
    }

    let token = match bearer_token(&request) {
        Some(t) => t,
        None => {
            if let Some(ref limiter) = auth_state.auth_failure_limiter {
                if limiter.record_failure(&client_ip).await {
                    return too_many_failures();
                }
            }
            return HttpAppError(AppError::Unauthorized(
                "Missing or malformed authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let claims = match decode::<JwtClaims>(
        &token,
        &auth_state.decoding_key,
        &Validation::new(Algorithm::HS256),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            if let Some(ref limiter) = auth_state.auth_failure_limiter {
                if limiter.record_failure(&client_ip).await {
                    return too_many_failures();
                }
            }
            tracing::debug!(client_ip = %client_ip, error = %e, "JWT verification failed");
            return HttpAppError(AppError::Unauthorized("Invalid or expired token".to_string()))
                .into_response();
        }
    };

    let user = match auth_state
        .user_repository
        .ensure_user(claims.sub, &claims.email, claims.name.as_deref())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            return HttpAppError(e).into_response();
        }
    };

    let context = AuthContext {
        user_id: user.id,
        email: user.email,
        name: user.name,
        default_organization_id: user.default_organization_id,
        pinned_organization_id: claims.org,
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())?;
    header.strip_prefix("Bearer ").map(|t| t.to_string())
}
