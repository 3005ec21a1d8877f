use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::generate_image::generate_image_handler;
use super::generate_text::generate_text_handler;
use super::ApiServer;

#[derive(Clone)]
pub struct AppState {
    pub api_server: Arc<ApiServer>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub upstream_reachable: bool,
}

/// Client identity used for rate-limit keying. Taken from the forwarding
/// header; every client without one shares the literal "unknown" bucket.
/// TODO(product): decide whether pooling header-less clients into one
/// budget is intended throttling of anonymous traffic or a gap.
pub(crate) fn client_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn start_server(
    api_server: ApiServer,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState {
        api_server: Arc::new(api_server),
    };

    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}").parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Generation endpoints
        .route("/v1/text/generate", post(generate_text_handler))
        .route("/v1/image/generate", post(generate_image_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let upstream_reachable = state.api_server.upstream_healthy().await;
    axum::response::Json(HealthResponse {
        status: "ok".to_string(),
        upstream_reachable,
    })
}
