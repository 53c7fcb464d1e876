//! services/api/src/web/session.rs
//!
//! Session endpoints used by the portal shell: teacher session validation and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use school_portal_core::Role;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{ErrorBody, RequestError};
use crate::web::{
    change_password::MessageBody,
    cookies::{clear_cookie, read_cookie},
    state::AppState,
    tokens::SessionClaims,
};

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub role: String,
    pub email: String,
}

/// Verifies the `teacher_token` cookie.
pub(crate) fn teacher_claims(state: &AppState, headers: &HeaderMap) -> Result<SessionClaims, RequestError> {
    let token = read_cookie(headers, Role::Teacher.cookie_name()).ok_or(RequestError::MissingToken)?;
    Ok(state.keys.verify(Role::Teacher, token)?)
}

/// GET /api/validate-teacher - Report the current teacher session
#[utoipa::path(
    get,
    path = "/api/validate-teacher",
    responses(
        (status = 200, description = "Valid teacher session", body = SessionResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 500, description = "Teacher sessions are not configured", body = ErrorBody)
    )
)]
pub async fn validate_teacher_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, RequestError> {
    let claims = teacher_claims(&state, &headers)?;
    debug!("Validated teacher session for {}.", claims.email);
    Ok(Json(SessionResponse {
        role: claims.role.to_string(),
        email: claims.email,
    }))
}

/// POST /api/logout - Clear every session cookie
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Session cookies cleared", body = MessageBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let present: Vec<&str> = Role::ALL
        .iter()
        .filter(|r| read_cookie(&headers, r.cookie_name()).is_some())
        .map(|r| r.as_str())
        .collect();
    info!("Logout requested; clearing sessions for {:?}.", present);

    let secure = state.secure_cookies();
    let cookies = Role::ALL.map(|role| (header::SET_COOKIE, clear_cookie(role, secure)));
    (
        StatusCode::OK,
        AppendHeaders(cookies),
        Json(MessageBody {
            message: "Logged out".to_string(),
        }),
    )
}
