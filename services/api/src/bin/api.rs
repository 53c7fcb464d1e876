//! services/api/src/bin/api.rs

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use portal_api_lib::{
    adapters::FirebaseClient,
    config::Config,
    error::ApiError,
    web::{router, state::AppState, tokens::SessionKeys, ApiDoc},
};
use school_portal_core::ports::{IdentityProvider, LiveQueryService};
use school_portal_core::Role;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded: {:?}", config);

    // --- 2. Build the Platform Client & Adapters ---
    let firebase = FirebaseClient::from_config(&config)?;
    let identity = firebase
        .identity_provider()
        .map(|adapter| Arc::new(adapter) as Arc<dyn IdentityProvider>);
    let live = firebase
        .live_queries(config.live_query_poll_interval)
        .map(|adapter| Arc::new(adapter) as Arc<dyn LiveQueryService>);

    // --- 3. Build the Shared AppState ---
    let keys = SessionKeys::from_config(&config);
    if !keys.supports(Role::Teacher) {
        warn!("TEACHER_JWT_SECRET is not set; teacher sessions will be rejected.");
    }
    let app_state = Arc::new(AppState {
        config: config.clone(),
        keys: Arc::new(keys),
        identity,
        live,
    });

    let origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid ALLOWED_ORIGIN '{}': {}",
            config.allowed_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
