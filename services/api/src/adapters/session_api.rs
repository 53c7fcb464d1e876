//! services/api/src/adapters/session_api.rs
//!
//! A `SessionApi` that talks to this service over HTTP, the way a portal
//! front end does: it forwards the browser's cookie header to the session
//! validation and logout endpoints.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use school_portal_core::ports::{PortError, PortResult, SessionApi};
use school_portal_core::{Role, SessionInfo};
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize)]
struct SessionBody {
    role: String,
    email: String,
}

#[derive(Clone)]
pub struct HttpSessionApi {
    http: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl HttpSessionApi {
    /// `base_url` is the service origin, e.g. `http://localhost:3000`.
    pub fn new(http: reqwest::Client, base_url: &str, cookie: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: cookie.into(),
        }
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn validate(&self) -> PortResult<SessionInfo> {
        let response = self
            .http
            .get(format!("{}/api/validate-teacher", self.base_url))
            .header(COOKIE, &self.cookie)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if !response.status().is_success() {
            debug!("Session validation returned {}.", response.status());
            return Err(PortError::Unauthorized);
        }
        let body: SessionBody = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let role = body.role.parse::<Role>().map_err(PortError::Unexpected)?;
        Ok(SessionInfo {
            role,
            email: body.email,
        })
    }

    async fn logout(&self) -> PortResult<()> {
        let response = self
            .http
            .post(format!("{}/api/logout", self.base_url))
            .header(COOKIE, &self.cookie)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "logout returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
