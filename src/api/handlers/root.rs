use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

use crate::api::state::AppState;

pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": "Donatrack API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Donation tracking for registered supporters",
        "status": "operational",
        "base_url": state.settings.server.base_url,
        "currency": state.settings.donations.currency,
        "payment_gateway": state.service_context.payment_gateway.name(),
        "endpoints": {
            "health": "/health",
            "auth": "/auth",
            "api": "/api",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_ok = sqlx::query("SELECT 1")
        .execute(&state.service_context.db_pool)
        .await
        .is_ok();

    let status = if database_ok {
        StatusCode::OK
    } else {
        tracing::error!("Health check failed: database unreachable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(json!({
        "status": if database_ok { "healthy" } else { "degraded" },
        "database": database_ok,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
