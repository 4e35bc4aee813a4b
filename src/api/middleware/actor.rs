//! Actor identity middleware.
//!
//! The service sits behind an authenticating proxy that forwards the
//! clinician id in `X-Actor-Id`. This layer only checks that the header is
//! present and injects `ActorContext` into request extensions for
//! downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ACTOR_HEADER};

/// Require a non-blank actor id on every protected request.
pub async fn require_actor(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_actor_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_actor_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let actor_id = req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    req.extensions_mut().insert(ActorContext { actor_id });
    Ok(next.run(req).await)
}
