pub mod change_password;
pub mod cookies;
pub mod navigation;
pub mod rest;
pub mod session;
pub mod state;
pub mod tokens;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::RequestError;

pub use change_password::change_password_handler;
pub use navigation::navigation_handler;
pub use rest::{health_handler, ApiDoc};
pub use session::{logout_handler, validate_teacher_handler};
pub use state::AppState;

/// Builds the API routes. Cross-cutting layers such as CORS and tracing are
/// added by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/change-password", post(change_password_handler))
        .route("/api/validate-teacher", get(validate_teacher_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/navigation", get(navigation_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(app_state)
}

/// Turns a panic inside a handler into the generic 500 body.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    RequestError::Internal(detail).into_response()
}
