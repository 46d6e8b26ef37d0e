//! Axum HTTP server.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::GatewayState;
use crate::{direct, unified};

/// Headroom on top of the largest upload for multipart framing and form fields.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the full router for `state`.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    let cors = cors_layer(&state.config.server().allowed_origins);

    let body_limit = state.limits().max_upload_bytes() + BODY_OVERHEAD_BYTES;

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/unified/text", post(unified::process_text))
        .route("/unified/audio", post(unified::process_audio))
        .route("/unified/image", post(unified::process_image))
        .route("/unified/supported-languages", get(unified::supported_languages))
        .route(
            "/unified/operation-combinations",
            get(unified::operation_combinations),
        )
        .route("/translate", post(direct::translate))
        .route("/translate/supported-pairs", get(direct::supported_pairs))
        .route("/translate/{pair}", post(direct::translate_pair))
        .route("/asr", post(direct::asr))
        .route("/asr/supported-languages", get(direct::asr_languages))
        .route("/tts", post(direct::tts))
        .route("/tts/supported-languages", get(direct::tts_languages))
        .route("/ocr", post(direct::ocr))
        .route("/ocr/supported-languages", get(direct::ocr_languages));

    #[cfg(feature = "metrics")]
    let app = app.route("/metrics", get(metrics_handler));

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// CORS policy for the configured origins.
///
/// A `*` entry allows any origin. Credentials are only allowed with an explicit list.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    if allowed_origins.iter().any(|o| o.trim() == "*") {
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins).allow_credentials(true)
}

/// Start the HTTP server and serve until Ctrl+C.
pub async fn start_gateway(state: Arc<GatewayState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    let credentials = state.config.provider().resolve_api_key().is_some();

    Json(json!({
        "status": "ok",
        "version": version,
        "credentials_configured": credentials,
    }))
}

#[cfg(feature = "metrics")]
async fn metrics_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => axum::http::StatusCode::NOT_FOUND.into_response(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
