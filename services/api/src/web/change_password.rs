//! services/api/src/web/change_password.rs
//!
//! `POST /api/change-password`: rotates the password of an owner or admin.
//! Each step short-circuits on the first failure.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use school_portal_core::{validate_password, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ErrorBody, RequestError};
use crate::web::{
    cookies::{clear_cookie, find_session_cookie},
    state::AppState,
};

/// Roles allowed to change their password here, in cookie precedence order.
const PRIVILEGED_ROLES: [Role; 2] = [Role::Owner, Role::Admin];

pub const PASSWORD_UPDATED: &str = "Password updated successfully. Please log in again.";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    /// Pulls the three fields out of a parsed body. Absent, non-string and empty
    /// values all count as missing.
    fn from_json(body: &Value) -> Option<Self> {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            email: field("email")?,
            current_password: field("currentPassword")?,
            new_password: field("newPassword")?,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /api/change-password - Re-authenticate and set a new password
#[utoipa::path(
    post,
    path = "/api/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed; the session cookie is cleared", body = MessageBody),
        (status = 400, description = "Malformed body, missing fields or weak password", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token, or wrong current password", body = ErrorBody),
        (status = 403, description = "Body email does not match the session", body = ErrorBody),
        (status = 429, description = "Too many sign-in attempts", body = ErrorBody),
        (status = 500, description = "Service unavailable or internal error", body = ErrorBody)
    )
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, RequestError> {
    // 1. The identity provider must be configured
    let identity = state
        .identity
        .as_ref()
        .ok_or(RequestError::ServiceUnavailable)?;

    // 2. Find a privileged session cookie
    let (role, token) =
        find_session_cookie(&headers, &PRIVILEGED_ROLES).ok_or(RequestError::MissingToken)?;

    // 3. Verify it with the secret of that role
    let claims = state.keys.verify(role, token)?;

    // 4. Parse the body
    let body: Value = serde_json::from_slice(&body).map_err(|_| RequestError::InvalidJson)?;

    // 5. Require every field
    let req = ChangePasswordRequest::from_json(&body).ok_or(RequestError::MissingFields)?;

    // 6. The session may only change its own password
    if claims.email != req.email {
        return Err(RequestError::EmailMismatch);
    }

    // 7. Prove knowledge of the current password
    let user = identity
        .sign_in(&req.email, &req.current_password)
        .await
        .map_err(RequestError::Reauthentication)?;

    // 8. Only now judge the new password
    validate_password(&req.new_password).map_err(RequestError::WeakPassword)?;

    // 9. Rotate the credential
    identity
        .update_password(&user, &req.new_password)
        .await
        .map_err(|e| RequestError::Internal(e.to_string()))?;

    info!("Password changed for {} ({}).", claims.email, role);

    // 10. Force a fresh login with the new credential
    let cookie = clear_cookie(role, state.secure_cookies());
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageBody {
            message: PASSWORD_UPDATED.to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_all_three_fields() {
        let req = ChangePasswordRequest::from_json(&json!({
            "email": "o@school.test",
            "currentPassword": "Old1!pass",
            "newPassword": "New1!pass"
        }))
        .unwrap();
        assert_eq!(req.email, "o@school.test");
        assert_eq!(req.current_password, "Old1!pass");
        assert_eq!(req.new_password, "New1!pass");
    }

    #[test]
    fn empty_missing_or_mistyped_fields_count_as_missing() {
        let bodies = [
            json!({"email": "o@school.test", "currentPassword": "x"}),
            json!({"email": "", "currentPassword": "x", "newPassword": "y"}),
            json!({"email": 42, "currentPassword": "x", "newPassword": "y"}),
            json!(["o@school.test", "x", "y"]),
            json!(null),
        ];
        for body in bodies {
            assert!(ChangePasswordRequest::from_json(&body).is_none(), "{}", body);
        }
    }
}
