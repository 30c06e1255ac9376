//! Entry point and health endpoints

use crate::{api::representation::index_model, state::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// GET /
pub async fn index(State(state): State<AppState>) -> Response {
    Json(index_model(&state.links)).into_response()
}

/// GET /health
///
/// 200 when the store answers a ping, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let backend = state.config.database.backend.as_str();
    match state.university_service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "store": backend,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, store = backend, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "store": backend,
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
