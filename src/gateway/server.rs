use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::api;
use crate::config::FlexConfig;
use crate::fs_util::ensure_dir;
use crate::memory::{ConversationMemory, MemoryStore};
use crate::relay::CompletionRelay;

pub const NO_CLIENT_MESSAGE: &str = "FLEXIBLE AI backend running. Client build not found.";

pub struct AppState {
    pub relay: CompletionRelay,
    pub config: FlexConfig,
}

impl AppState {
    /// Build state with a fresh in-process memory store and the provider
    /// described by `config.chat`.
    pub fn from_config(config: FlexConfig) -> Self {
        let memory: Arc<dyn ConversationMemory> = Arc::new(MemoryStore::new());
        let relay = CompletionRelay::from_config(&config.chat, memory);
        Self { relay, config }
    }
}

/// Assemble the HTTP surface.
///
/// The uploads directory must exist before files are posted; [`run`]
/// creates it.
pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let uploads = ServeDir::new(&server.uploads_dir);
    let dist = &server.client_dist;

    let app = Router::new()
        .route("/api/chat", post(api::chat))
        .route(
            "/api/upload",
            post(api::upload).layer(DefaultBodyLimit::max(server.max_upload_bytes)),
        )
        .route("/health", get(health))
        .nest_service("/uploads", uploads);

    let app = if dist.is_dir() {
        info!(dist = %dist.display(), "serving client build");
        let index = ServeFile::new(dist.join("index.html"));
        app.fallback_service(ServeDir::new(dist).fallback(index))
    } else {
        app.route("/", get(no_client))
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: FlexConfig) -> anyhow::Result<()> {
    ensure_dir(&config.server.uploads_dir)?;

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = Arc::new(AppState::from_config(config));
    if !state.relay.has_provider() {
        warn!("OPENAI_API_KEY not set, /api/chat will return configuration errors");
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("FLEXIBLE AI server listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn no_client() -> &'static str {
    NO_CLIENT_MESSAGE
}
