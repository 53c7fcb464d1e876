#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use portal_api_lib::{
    config::Config,
    web::{router, state::AppState, tokens::SessionKeys},
};
use school_portal_core::memory::InMemoryLiveQuery;
use school_portal_core::ports::{
    IdentityProvider, LiveQueryService, PortError, PortResult, SignInError,
};
use school_portal_core::{AuthenticatedUser, Role};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const OWNER_SECRET: &str = "owner-test-secret";
pub const ADMIN_SECRET: &str = "admin-test-secret";
pub const TEACHER_SECRET: &str = "teacher-test-secret";

pub const OWNER_EMAIL: &str = "owner@school.test";
pub const ADMIN_EMAIL: &str = "admin@school.test";
pub const TEACHER_EMAIL: &str = "teacher@school.test";

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: Vec<(String, String)> = vec![
        ("OWNER_JWT_SECRET".into(), OWNER_SECRET.into()),
        ("ADMIN_JWT_SECRET".into(), ADMIN_SECRET.into()),
        ("TEACHER_JWT_SECRET".into(), TEACHER_SECRET.into()),
        ("LIVE_QUERY_TIMEOUT_SECS".into(), "2".into()),
    ];
    for (k, v) in extra {
        vars.retain(|(key, _)| key != k);
        vars.push((k.to_string(), v.to_string()));
    }
    Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
    })
    .expect("test config is valid")
}

/// An identity provider that knows one password per email.
pub struct FakeIdentity {
    pub passwords: Mutex<Vec<(String, String)>>,
    pub forced_error: Option<SignInError>,
    pub fail_update: bool,
    pub panic_on_sign_in: bool,
    pub sign_ins: AtomicUsize,
    pub updates: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self {
            passwords: Mutex::new(vec![
                (OWNER_EMAIL.to_string(), "OldPass1!".to_string()),
                (ADMIN_EMAIL.to_string(), "AdminPass1!".to_string()),
            ]),
            forced_error: None,
            fail_update: false,
            panic_on_sign_in: false,
            sign_ins: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn failing_with(err: SignInError) -> Self {
        Self {
            forced_error: Some(err),
            ..Self::new()
        }
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.passwords
            .lock()
            .unwrap()
            .iter()
            .find(|(e, _)| e == email)
            .map(|(_, p)| p.clone())
    }

    pub fn sign_in_count(&self) -> usize {
        self.sign_ins.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser, SignInError> {
        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_sign_in {
            panic!("credential store exploded");
        }
        if let Some(err) = &self.forced_error {
            return Err(err.clone());
        }
        match self.password_of(email) {
            None => Err(SignInError::UserNotFound),
            Some(stored) if stored == password => Ok(AuthenticatedUser {
                uid: format!("uid-{}", email),
                email: email.to_string(),
                id_token: "id-token".to_string(),
            }),
            Some(_) => Err(SignInError::WrongPassword),
        }
    }

    async fn update_password(&self, user: &AuthenticatedUser, new_password: &str) -> PortResult<()> {
        if self.fail_update {
            return Err(PortError::Unexpected("CREDENTIAL_TOO_OLD_LOGIN_AGAIN".to_string()));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut passwords = self.passwords.lock().unwrap();
        if let Some(entry) = passwords.iter_mut().find(|(e, _)| *e == user.email) {
            entry.1 = new_password.to_string();
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub fn build_app(
    config: Config,
    identity: Option<Arc<FakeIdentity>>,
    live: Option<Arc<InMemoryLiveQuery>>,
) -> TestApp {
    build_app_with_live(config, identity, live.map(|l| l as Arc<dyn LiveQueryService>))
}

pub fn build_app_with_live(
    config: Config,
    identity: Option<Arc<FakeIdentity>>,
    live: Option<Arc<dyn LiveQueryService>>,
) -> TestApp {
    let state = Arc::new(AppState {
        keys: Arc::new(SessionKeys::from_config(&config)),
        config: Arc::new(config),
        identity: identity.map(|i| i as Arc<dyn IdentityProvider>),
        live,
    });
    TestApp {
        router: router(state.clone()),
        state,
    }
}

pub fn token(role: Role, email: &str) -> String {
    let keys = SessionKeys::new(OWNER_SECRET, ADMIN_SECRET, Some(TEACHER_SECRET));
    keys.issue(role, email, chrono::Duration::hours(1))
        .expect("token signs")
}

pub fn expired_token(role: Role, email: &str) -> String {
    let keys = SessionKeys::new(OWNER_SECRET, ADMIN_SECRET, Some(TEACHER_SECRET));
    keys.issue(role, email, chrono::Duration::minutes(-10))
        .expect("token signs")
}

pub fn cookie(role: Role, token: &str) -> String {
    format!("{}={}", role.cookie_name(), token)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
