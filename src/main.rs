//! geochat - location-grounded chat backend
//!
//! A Rust backend implementing a conversation state machine for a chat
//! client whose answers are grounded with web and map search near the
//! user's position.

mod api;
mod config;
mod geo;
mod llm;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::Config;
use geo::LocationProvider;
use llm::{GeminiClient, GroundedClient, LoggingClient};
use runtime::{LocationSource, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geochat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration. A missing credential is a fatal precondition and is
    // reported here, before any network I/O.
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Configuration error");
    })?;

    let gemini = GeminiClient::new(
        config.api_key.clone(),
        config.model.clone(),
        config.base_url.as_deref(),
    )?;
    let client: Arc<dyn GroundedClient> = Arc::new(LoggingClient::new(Arc::new(gemini)));
    tracing::info!(model = %client.model_id(), "Grounded client initialized");

    if config.location_url.is_none() {
        tracing::warn!("Geolocation disabled; requests will carry no retrieval bias");
    }
    let location_source: Arc<dyn LocationSource> =
        Arc::new(LocationProvider::new(config.location_url.clone()));

    // One session for the process lifetime; the runtime kicks off the
    // one-shot position acquisition as it starts.
    let session = SessionManager::start(client, location_source);
    let state = AppState::new(session);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("geochat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
