use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AuditAction, AuditEntity};

/// A row of the `audit_log` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub actor_id: Option<String>,
    pub entity: AuditEntity,
    pub entity_id: String,
    pub action: AuditAction,
    pub metadata: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

impl AuditLog {
    /// A new entry stamped with a fresh id and the current UTC time.
    pub fn new(
        actor_id: Option<String>,
        entity: AuditEntity,
        entity_id: impl Into<String>,
        action: AuditAction,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            entity,
            entity_id: entity_id.into(),
            action,
            metadata,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
