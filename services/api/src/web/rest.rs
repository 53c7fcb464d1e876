//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification and the
//! small handlers that do not belong to a feature module.

use axum::response::IntoResponse;
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::web::{change_password, navigation, session};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        change_password::change_password_handler,
        session::validate_teacher_handler,
        session::logout_handler,
        navigation::navigation_handler,
        health_handler,
    ),
    components(
        schemas(
            change_password::ChangePasswordRequest,
            change_password::MessageBody,
            session::SessionResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "School Portal API", description = "Session and account endpoints for the school portal.")
    )
)]
pub struct ApiDoc;

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}
