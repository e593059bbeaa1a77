//! Session tokens (HS256 JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, BookingError, BookingResult, User, UserRole};

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    /// Written to `iss` and required on verification
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
            issuer: "justdreams-booking".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            ..Self::default()
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiration_hours * 3600
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: &str, username: &str, role: UserRole, config: &JwtConfig) -> Self {
        let issued = Utc::now();
        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: issued.timestamp(),
            exp: (issued + Duration::hours(config.expiration_hours)).timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn actor(&self) -> Actor {
        match self.role {
            UserRole::Admin => Actor::admin(self.sub.clone()),
            UserRole::User => Actor::user(self.sub.clone()),
        }
    }
}

pub fn create_token(user: &User, config: &JwtConfig) -> BookingResult<String> {
    let claims = TokenClaims::new(&user.id, &user.username, user.role, config);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| BookingError::Storage(format!("token encoding failed: {}", e)))
}

/// Any failure is `Unauthorized`; only the message tells expiry apart.
pub fn verify_token(token: &str, config: &JwtConfig) -> BookingResult<TokenClaims> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => BookingError::Unauthorized("token expired".to_string()),
        _ => BookingError::Unauthorized(format!("invalid token: {}", e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: "u-1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.test".to_string(),
            password_hash: String::new(),
            first_name: "Alice".to_string(),
            last_name: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn claims_carry_the_role() {
        let config = JwtConfig::new("test-secret", 1);
        let token = create_token(&user(UserRole::Admin), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.actor(), Actor::admin("u-1"));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = create_token(&user(UserRole::User), &JwtConfig::new("a", 1)).unwrap();
        assert!(matches!(
            verify_token(&token, &JwtConfig::new("b", 1)),
            Err(BookingError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let config = JwtConfig::new("secret", -2);
        let token = create_token(&user(UserRole::User), &config).unwrap();
        match verify_token(&token, &config) {
            Err(BookingError::Unauthorized(msg)) => assert_eq!(msg, "token expired"),
            other => panic!("expected expiry, got {:?}", other.map(|c| c.sub)),
        }
    }
}
