//! Audit trail query endpoints.
//!
//! - `GET /api/audit?limit=&entity=&actor=`: most recent entries first.
//! - `GET /api/audit/:entity/:id`: full history of one entity, newest first.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::enums::AuditEntity;
use crate::models::{AuditFilter, AuditLog, DEFAULT_AUDIT_LIMIT};

/// Upper bound on `limit`.
pub const MAX_AUDIT_LIMIT: u32 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u32>,
    pub entity: Option<String>,
    pub actor: Option<String>,
}

fn parse_entity(raw: &str) -> Result<AuditEntity, ApiError> {
    raw.trim()
        .parse::<AuditEntity>()
        .map_err(|_| ApiError::BadRequest(format!("Unknown audit entity '{raw}'")))
}

impl AuditQuery {
    fn into_filter(self) -> Result<AuditFilter, ApiError> {
        let entity = self
            .entity
            .filter(|e| !e.trim().is_empty())
            .map(|e| parse_entity(&e))
            .transpose()?;

        Ok(AuditFilter {
            limit: self.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).min(MAX_AUDIT_LIMIT),
            entity,
            actor_id: self.actor.filter(|a| !a.trim().is_empty()),
        })
    }
}

pub async fn recent(
    State(ctx): State<ApiContext>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let filter = query.into_filter()?;
    let core = Arc::clone(&ctx.core);

    let entries = tokio::task::spawn_blocking(move || -> Result<Vec<AuditLog>, ApiError> {
        let conn = core.open_db()?;
        Ok(repository::get_recent_audit_logs(&conn, &filter)?)
    })
    .await
    .map_err(|e| CoreError::TaskJoin(e.to_string()))??;

    Ok(Json(entries))
}

pub async fn history(
    State(ctx): State<ApiContext>,
    Path((entity, entity_id)): Path<(String, String)>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let entity = parse_entity(&entity)?;
    let core = Arc::clone(&ctx.core);

    let entries = tokio::task::spawn_blocking(move || -> Result<Vec<AuditLog>, ApiError> {
        let conn = core.open_db()?;
        Ok(repository::get_audit_logs(&conn, &entity, &entity_id)?)
    })
    .await
    .map_err(|e| CoreError::TaskJoin(e.to_string()))??;

    Ok(Json(entries))
}
