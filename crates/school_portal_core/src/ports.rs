//! crates/school_portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the identity provider, the real-time database and HTTP.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, LiveQuery, SessionInfo};
use crate::subscription::Subscription;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Why the identity provider refused a password sign-in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignInError {
    #[error("wrong password")]
    WrongPassword,
    #[error("too many requests")]
    TooManyRequests,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid email")]
    InvalidEmail,
    /// Any provider code without a dedicated mapping, kept verbatim for logs.
    #[error("sign-in rejected: {0}")]
    Other(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in with email and password, proving the caller knows the current credential.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser, SignInError>;

    /// Replaces the password of a user who has just signed in.
    async fn update_password(&self, user: &AuthenticatedUser, new_password: &str) -> PortResult<()>;
}

#[async_trait]
pub trait LiveQueryService: Send + Sync {
    /// Opens a push-based subscription. The first snapshot is the current result set.
    async fn watch(&self, query: LiveQuery) -> PortResult<Subscription>;
}

#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Reports the role and email of the current session.
    async fn validate(&self) -> PortResult<SessionInfo>;

    /// Ends the current session.
    async fn logout(&self) -> PortResult<()>;
}
