//! services/api/src/web/navigation.rs
//!
//! `GET /api/navigation`: renders the teacher sidebar on the server from the
//! same live subscriptions a client-side sidebar would hold.

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use school_portal_core::{
    MountOutcome, PortResult, RenderedSidebar, SessionApi, SessionInfo, Sidebar,
    SidebarCapabilities,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::warn;
use utoipa::IntoParams;

use crate::error::{ErrorBody, RequestError};
use crate::web::{session::teacher_claims, state::AppState};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NavigationQuery {
    /// Render the collapsed (icon-only) variant.
    #[serde(default)]
    pub collapsed: bool,
}

/// A session that this request has already verified.
struct VerifiedSession {
    info: SessionInfo,
}

#[async_trait]
impl SessionApi for VerifiedSession {
    async fn validate(&self) -> PortResult<SessionInfo> {
        Ok(self.info.clone())
    }

    async fn logout(&self) -> PortResult<()> {
        Ok(())
    }
}

/// GET /api/navigation - Sidebar entries for the current teacher
#[utoipa::path(
    get,
    path = "/api/navigation",
    params(NavigationQuery),
    responses(
        (status = 200, description = "Rendered sidebar"),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 503, description = "Live data is unavailable or too slow to subscribe", body = ErrorBody)
    )
)]
pub async fn navigation_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NavigationQuery>,
    headers: HeaderMap,
) -> Result<Json<RenderedSidebar>, RequestError> {
    let claims = teacher_claims(&state, &headers)?;
    let live = state.live.clone().ok_or(RequestError::LiveDataUnavailable)?;

    let email = claims.email.clone();
    let session = Arc::new(VerifiedSession {
        info: SessionInfo {
            role: claims.role,
            email: claims.email,
        },
    });

    // Opening the subscriptions and waiting for their first snapshots share one budget.
    let deadline = Instant::now() + state.config.live_query_timeout;
    let mount = Sidebar::mount(SidebarCapabilities::teacher_portal(), session, live);
    let sidebar = match tokio::time::timeout_at(deadline, mount).await {
        Ok(MountOutcome::Mounted(sidebar)) => sidebar,
        Ok(MountOutcome::Redirect(_)) => return Err(RequestError::LiveDataUnavailable),
        Err(_) => {
            warn!(
                "Opening live subscriptions for {} took longer than {:?}.",
                email, state.config.live_query_timeout
            );
            return Err(RequestError::LiveDataUnavailable);
        }
    };

    sidebar.set_collapsed(query.collapsed);
    let remaining = deadline.saturating_duration_since(Instant::now());
    if !sidebar.wait_ready(remaining).await {
        warn!(
            "Live data for {} not ready in time; rendering what has arrived.",
            sidebar.session().email
        );
    }
    let rendered = sidebar.render();
    sidebar.unmount();
    Ok(Json(rendered))
}
