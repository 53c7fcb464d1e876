//! services/api/src/adapters/firebase.rs
//!
//! The handle to the managed identity and data platform. It is built once at
//! startup from `Config` and hands out the adapters that implement the core ports.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::adapters::firestore::FirestoreLiveQuery;
use crate::adapters::identity_toolkit::IdentityToolkitAdapter;
use crate::config::Config;
use crate::error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct Settings {
    api_key: Option<String>,
    project_id: Option<String>,
    auth_url: String,
    firestore_url: String,
}

/// Shared HTTP client plus project settings. Cheap to clone.
#[derive(Clone)]
pub struct FirebaseClient {
    http: reqwest::Client,
    settings: Arc<Settings>,
}

impl FirebaseClient {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            settings: Arc::new(Settings {
                api_key: config.firebase_api_key.clone(),
                project_id: config.firebase_project_id.clone(),
                auth_url: config.firebase_auth_url.trim_end_matches('/').to_string(),
                firestore_url: config.firestore_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn api_key(&self) -> Option<&str> {
        self.settings.api_key.as_deref()
    }

    /// `<auth_url>/accounts:<operation>`
    pub fn auth_endpoint(&self, operation: &str) -> String {
        format!("{}/accounts:{}", self.settings.auth_url, operation)
    }

    /// The `runQuery` endpoint of the project's default database.
    pub fn run_query_endpoint(&self) -> Option<String> {
        self.settings.project_id.as_ref().map(|project| {
            format!(
                "{}/projects/{}/databases/(default)/documents:runQuery",
                self.settings.firestore_url, project
            )
        })
    }

    /// The password sign-in adapter, when an API key is configured.
    pub fn identity_provider(&self) -> Option<IdentityToolkitAdapter> {
        if self.settings.api_key.is_none() {
            warn!("FIREBASE_API_KEY is not set; password changes are disabled.");
            return None;
        }
        Some(IdentityToolkitAdapter::new(self.clone()))
    }

    /// The live-query adapter, when a project is configured.
    pub fn live_queries(&self, poll_interval: Duration) -> Option<FirestoreLiveQuery> {
        if self.settings.project_id.is_none() {
            warn!("FIREBASE_PROJECT_ID is not set; live navigation data is disabled.");
            return None;
        }
        Some(FirestoreLiveQuery::new(self.clone(), poll_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>, project: Option<&str>) -> Config {
        let mut vars = vec![
            ("OWNER_JWT_SECRET", "o".to_string()),
            ("ADMIN_JWT_SECRET", "a".to_string()),
            ("FIRESTORE_URL", "http://localhost:8080/v1/".to_string()),
        ];
        if let Some(k) = api_key {
            vars.push(("FIREBASE_API_KEY", k.to_string()));
        }
        if let Some(p) = project {
            vars.push(("FIREBASE_PROJECT_ID", p.to_string()));
        }
        Config::from_lookup(|key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone()))
            .unwrap()
    }

    #[test]
    fn adapters_require_their_settings() {
        let client = FirebaseClient::from_config(&config(None, None)).unwrap();
        assert!(client.identity_provider().is_none());
        assert!(client.live_queries(Duration::from_secs(1)).is_none());
        assert!(client.run_query_endpoint().is_none());

        let client = FirebaseClient::from_config(&config(Some("key"), Some("school"))).unwrap();
        assert!(client.identity_provider().is_some());
        assert!(client.live_queries(Duration::from_secs(1)).is_some());
    }

    #[test]
    fn endpoints_are_built_from_the_base_urls() {
        let client = FirebaseClient::from_config(&config(Some("key"), Some("school"))).unwrap();
        assert_eq!(
            client.auth_endpoint("signInWithPassword"),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
        );
        assert_eq!(
            client.run_query_endpoint().unwrap(),
            "http://localhost:8080/v1/projects/school/databases/(default)/documents:runQuery"
        );
    }
}
