//! services/api/src/error.rs
//!
//! Defines the startup error type for the service and the per-request error
//! type that every handler returns.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use school_portal_core::{PolicyViolation, SignInError};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::config::ConfigError;
use crate::web::tokens::TokenError;

/// The primary error type for starting the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a failure to build the outbound HTTP client.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

//=========================================================================================
// Request Errors
//=========================================================================================

/// The JSON body of every failed request.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Every way a request can fail. The `Display` text is what the client sees.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Authentication service is not available")]
    ServiceUnavailable,
    #[error("Live data service is not available")]
    LiveDataUnavailable,
    #[error("Unauthorized: no session token")]
    MissingToken,
    #[error("{0}")]
    Token(TokenError),
    #[error("Invalid JSON body")]
    InvalidJson,
    #[error("Email, current password and new password are required")]
    MissingFields,
    #[error("Forbidden: email does not match session")]
    EmailMismatch,
    #[error("{}", reauthentication_message(.0))]
    Reauthentication(SignInError),
    #[error("{0}")]
    WeakPassword(PolicyViolation),
    #[error("Internal server error: {0}")]
    Internal(String),
}

fn reauthentication_message(err: &SignInError) -> &'static str {
    match err {
        SignInError::WrongPassword => "Current password is incorrect",
        SignInError::TooManyRequests => "Too many attempts. Please try again later.",
        SignInError::UserNotFound => "User not found",
        SignInError::InvalidEmail => "Invalid email address",
        SignInError::Other(_) => "Authentication failed",
    }
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            RequestError::LiveDataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            RequestError::MissingToken | RequestError::Token(_) => StatusCode::UNAUTHORIZED,
            RequestError::InvalidJson
            | RequestError::MissingFields
            | RequestError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            RequestError::EmailMismatch => StatusCode::FORBIDDEN,
            RequestError::Reauthentication(e) => match e {
                SignInError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
                SignInError::InvalidEmail => StatusCode::BAD_REQUEST,
                SignInError::WrongPassword
                | SignInError::UserNotFound
                | SignInError::Other(_) => StatusCode::UNAUTHORIZED,
            },
            RequestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for RequestError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired | TokenError::RoleMismatch => {
                RequestError::Token(err)
            }
            other => RequestError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {:?}", status, self);
        } else {
            warn!("Request rejected ({}): {:?}", status, self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reauthentication_failures_map_to_distinct_statuses() {
        let cases = [
            (SignInError::WrongPassword, StatusCode::UNAUTHORIZED, "Current password is incorrect"),
            (
                SignInError::TooManyRequests,
                StatusCode::TOO_MANY_REQUESTS,
                "Too many attempts. Please try again later.",
            ),
            (SignInError::UserNotFound, StatusCode::UNAUTHORIZED, "User not found"),
            (SignInError::InvalidEmail, StatusCode::BAD_REQUEST, "Invalid email address"),
            (
                SignInError::Other("USER_DISABLED".to_string()),
                StatusCode::UNAUTHORIZED,
                "Authentication failed",
            ),
        ];
        for (cause, status, message) in cases {
            let err = RequestError::Reauthentication(cause);
            assert_eq!(err.status(), status);
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn token_errors_are_unauthorized_with_their_own_messages() {
        let expired = RequestError::from(TokenError::Expired);
        let invalid = RequestError::from(TokenError::Invalid);
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
        assert_ne!(expired.to_string(), invalid.to_string());
    }

    #[test]
    fn internal_errors_embed_the_detail() {
        let err = RequestError::Internal("boom".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error: boom");
        assert_eq!(
            RequestError::ServiceUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
