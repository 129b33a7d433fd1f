//! services/api/src/bin/api.rs

use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
};
use fleet_api::{
    adapters::{DisabledInsightAdapter, JsonFileStorage, OpenAiInsightAdapter},
    config::{Config, ConfigError},
    error::ApiError,
    web::{build_router, state::AppState},
};
use fleet_core::{InsightService, StorageService};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Prepare Storage ---
    let storage = JsonFileStorage::new(config.data_dir.clone());
    storage.ensure_root().await?;
    info!("Storing collections under {}", storage.root().display());
    let storage: Arc<dyn StorageService> = Arc::new(storage);

    // --- 3. Initialize the Insight Adapter ---
    let insight: Arc<dyn InsightService> = match &config.openai_api_key {
        Some(key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(key));
            Arc::new(OpenAiInsightAdapter::new(
                openai_client,
                config.insight_model.clone(),
                config.insight_think_model.clone(),
            ))
        }
        None => {
            warn!("OPENAI_API_KEY is not set; insight chat will answer with its fallback.");
            Arc::new(DisabledInsightAdapter)
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = AppState::load(config.clone(), storage, insight).await?;

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = build_router(app_state)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
