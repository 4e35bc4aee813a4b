//! Shared types for the HTTP API layer.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::pipeline::import::{ImportResult, ImportSummary, ParsedSheet};

/// Header carrying the authenticated clinician id, set by the upstream
/// auth proxy.
pub const ACTOR_HEADER: &str = "X-Actor-Id";

// ═══════════════════════════════════════════════════════════
// API context: shared state for router and middleware
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Acting clinician, injected into request extensions by the actor
/// middleware.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: String,
}

// ═══════════════════════════════════════════════════════════
// Import request / response
// ═══════════════════════════════════════════════════════════

/// What an upload should do: parse only, or parse and persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportIntent {
    #[default]
    Preview,
    Import,
}

impl FromStr for ImportIntent {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "preview" => Ok(Self::Preview),
            "import" => Ok(Self::Import),
            other => Err(ApiError::BadRequest(format!(
                "Unknown intent '{other}', expected 'preview' or 'import'"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ImportResponse {
    Preview {
        sheets: Vec<ParsedSheet>,
        summary: ImportSummary,
    },
    Import {
        summary: ImportSummary,
        result: ImportResult,
    },
}
