//! Access logging middleware.
//!
//! Logs method, path, status and latency of every protected request with
//! the acting clinician. Request bodies never reach the log.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::ActorContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let actor_id = req
        .extensions()
        .get::<ActorContext>()
        .map(|a| a.actor_id.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let started = Instant::now();
    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        actor_id = %actor_id,
        latency_ms = started.elapsed().as_millis() as u64,
        "API access"
    );

    response
}
