use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

const SERVICE_NAME: &str = "health-flows-service";

/// Liveness probe. Does not touch the model provider.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the model provider must answer its health check.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state.runner.provider();
    match provider.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "service": SERVICE_NAME,
                "provider": provider.name(),
                "model": provider.model(),
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, provider = provider.name(), "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "service": SERVICE_NAME,
                    "provider": provider.name(),
                    "error": e.to_string(),
                })),
            )
        }
    }
}
