//! HTTP API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Cache-Control header → 2. Actor resolver → 3. Access logger → 4. Body limit

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Room for multipart framing and the `intent` field on top of the file.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Build the API router.
///
/// `/api/health` is open; every other route requires an actor identity.
/// Handlers use `State<ApiContext>`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    let body_limit = body_limit(ctx.core.import.max_upload_bytes);

    // Layers are applied from bottom (innermost) to top (outermost).
    let protected = Router::new()
        .route("/import", post(endpoints::import::upload))
        .route("/audit", get(endpoints::audit::recent))
        .route("/audit/:entity/:id", get(endpoints::audit::history))
        .route("/patients", get(endpoints::patients::list))
        .route("/patients/:id/disciplines", put(endpoints::patients::set_disciplines))
        .with_state(ctx.clone())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::actor::require_actor))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected.merge(open))
        .layer(TraceLayer::new_for_http())
}

fn body_limit(max_upload_bytes: u64) -> usize {
    usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX)
}
