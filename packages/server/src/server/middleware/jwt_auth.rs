use crate::common::{Actor, AuthError, MemberId};
use crate::domains::auth::JwtService;
use crate::domains::member::MemberRole;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

/// Authenticated caller, decoded from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub member_id: MemberId,
    pub role: MemberRole,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.member_id, self.role)
    }
}

/// Require an authenticated caller
pub fn require_auth(user: Option<AuthUser>) -> Result<AuthUser, AuthError> {
    user.ok_or(AuthError::AuthenticationRequired)
}

/// JWT authentication middleware
///
/// Verifies the Authorization header and stores an `AuthUser` in request
/// extensions. A missing or invalid token leaves the request anonymous.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(member_id = %user.member_id, role = %user.role, "Authenticated request");
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Accept both "Bearer <token>" and a raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        member_id: claims.member_id,
        role: claims.role,
    })
}
