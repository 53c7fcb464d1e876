//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::tokens::SessionKeys;
use school_portal_core::ports::{IdentityProvider, LiveQueryService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// Adapters are optional: a missing one makes the routes that need it fail cleanly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub keys: Arc<SessionKeys>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub live: Option<Arc<dyn LiveQueryService>>,
}

impl AppState {
    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.config.production
    }
}
