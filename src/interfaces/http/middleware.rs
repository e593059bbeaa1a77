//! Bearer-token authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::{Actor, BookingError, UserRole};
use crate::infrastructure::crypto::{verify_token, JwtConfig, TokenClaims};
use crate::interfaces::http::common::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Identity taken from a verified JWT, stored in request extensions.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn actor(&self) -> Actor {
        if self.is_admin() {
            Actor::admin(self.user_id.clone())
        } else {
            Actor::user(self.user_id.clone())
        }
    }

    /// `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(BookingError::Forbidden("admin role required".to_string()).into())
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unauthorized(message: &str) -> Response {
    ApiError(BookingError::Unauthorized(message.to_string())).into_response()
}

/// Reject requests without a valid `Authorization: Bearer <jwt>`.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return unauthorized("missing authentication token");
    };

    let Some(token) = extract_token(auth_header) else {
        return unauthorized("invalid authentication token");
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            let user = AuthenticatedUser::from_claims(claims);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "JWT rejected");
            ApiError(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Bearer "), None);
        assert_eq!(extract_token("Basic abc"), None);
    }

    #[test]
    fn admin_claims_become_admin_actor() {
        let cfg = JwtConfig::new("secret", 1);
        let claims = TokenClaims::new("u-1", "root", UserRole::Admin, &cfg);
        let user = AuthenticatedUser::from_claims(claims);
        assert!(user.is_admin());
        assert_eq!(user.actor(), Actor::admin("u-1"));
        assert!(user.require_admin().is_ok());

        let claims = TokenClaims::new("u-2", "guest", UserRole::User, &cfg);
        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.actor(), Actor::user("u-2"));
        assert!(user.require_admin().is_err());
    }
}
