use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{AuditAction, AuditEntity};
use crate::models::{AuditFilter, AuditLog};

use super::{format_timestamp, parse_timestamp};

/// Insert a batch of audit entries into the audit_log table.
pub fn insert_audit_entries(conn: &Connection, entries: &[AuditLog]) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO audit_log (id, actor_id, entity, entity_id, action, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for entry in entries {
        stmt.execute(params![
            entry.id.to_string(),
            entry.actor_id,
            entry.entity.as_str(),
            entry.entity_id,
            entry.action.as_str(),
            entry.metadata.as_ref().map(|m| m.to_string()),
            format_timestamp(&entry.created_at),
        ])?;
    }
    Ok(())
}

/// Full history of one entity, newest first.
pub fn get_audit_logs(
    conn: &Connection,
    entity: &AuditEntity,
    entity_id: &str,
) -> Result<Vec<AuditLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, actor_id, entity, entity_id, action, metadata, created_at FROM audit_log
         WHERE entity = ?1 AND entity_id = ?2
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt
        .query_map(params![entity.as_str(), entity_id], read_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(audit_from_row).collect()
}

/// Most recent entries first, capped at `filter.limit`.
pub fn get_recent_audit_logs(
    conn: &Connection,
    filter: &AuditFilter,
) -> Result<Vec<AuditLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, actor_id, entity, entity_id, action, metadata, created_at FROM audit_log
         WHERE (?1 IS NULL OR entity = ?1) AND (?2 IS NULL OR actor_id = ?2)
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(
            params![
                filter.entity.map(|e| e.as_str()),
                filter.actor_id,
                filter.limit,
            ],
            read_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(audit_from_row).collect()
}

struct AuditRow {
    id: String,
    actor_id: Option<String>,
    entity: String,
    entity_id: String,
    action: String,
    metadata: Option<String>,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<AuditRow> {
    Ok(AuditRow {
        id: row.get(0)?,
        actor_id: row.get(1)?,
        entity: row.get(2)?,
        entity_id: row.get(3)?,
        action: row.get(4)?,
        metadata: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn audit_from_row(row: AuditRow) -> Result<AuditLog, DatabaseError> {
    Ok(AuditLog {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        actor_id: row.actor_id,
        entity: AuditEntity::from_str(&row.entity)?,
        entity_id: row.entity_id,
        action: AuditAction::from_str(&row.action)?,
        // Metadata written by other tools may not be JSON; drop it rather than fail the query
        metadata: row.metadata.and_then(|m| serde_json::from_str(&m).ok()),
        created_at: parse_timestamp(&row.created_at)?,
    })
}
