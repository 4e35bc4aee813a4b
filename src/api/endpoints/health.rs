//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// `GET /api/health`: liveness plus a database reachability check.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let core = Arc::clone(&ctx.core);
    let reachable = tokio::task::spawn_blocking(move || core.open_db().is_ok())
        .await
        .unwrap_or(false);

    if !reachable {
        tracing::warn!("Health check could not open the database");
    }

    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        database: if reachable { "ok" } else { "unavailable" },
    })
}
