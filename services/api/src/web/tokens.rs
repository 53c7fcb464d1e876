//! services/api/src/web/tokens.rs
//!
//! Role-scoped session tokens. Every role signs with its own secret, and a
//! token is only accepted for the role whose cookie carried it.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use school_portal_core::Role;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub role: Role,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token role")]
    RoleMismatch,
    #[error("No signing key is configured for role {0}")]
    KeyUnavailable(Role),
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

struct RoleKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl RoleKey {
    fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// The signing keys of every role that may hold a session.
pub struct SessionKeys {
    owner: RoleKey,
    admin: RoleKey,
    teacher: Option<RoleKey>,
}

impl SessionKeys {
    pub fn new(owner_secret: &str, admin_secret: &str, teacher_secret: Option<&str>) -> Self {
        Self {
            owner: RoleKey::new(owner_secret),
            admin: RoleKey::new(admin_secret),
            teacher: teacher_secret.map(RoleKey::new),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.owner_jwt_secret,
            &config.admin_jwt_secret,
            config.teacher_jwt_secret.as_deref(),
        )
    }

    fn key(&self, role: Role) -> Result<&RoleKey, TokenError> {
        match role {
            Role::Owner => Ok(&self.owner),
            Role::Admin => Ok(&self.admin),
            Role::Teacher => self.teacher.as_ref().ok_or(TokenError::KeyUnavailable(role)),
        }
    }

    /// Whether tokens for `role` can be issued and verified.
    pub fn supports(&self, role: Role) -> bool {
        self.key(role).is_ok()
    }

    /// Signs a token for `email` that stays valid for `ttl`.
    pub fn issue(&self, role: Role, email: &str, ttl: Duration) -> Result<String, TokenError> {
        let key = self.key(role)?;
        let now = Utc::now();
        let claims = SessionClaims {
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks signature and expiry with the secret of `role`, then that the
    /// embedded role is `role` itself.
    pub fn verify(&self, role: Role, token: &str) -> Result<SessionClaims, TokenError> {
        let key = self.key(role)?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<SessionClaims>(token, &key.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        if data.claims.role != role {
            return Err(TokenError::RoleMismatch);
        }
        Ok(data.claims)
    }
}
