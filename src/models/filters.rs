use super::enums::{AuditEntity, PatientStatus};

/// Default page size for recent audit queries.
pub const DEFAULT_AUDIT_LIMIT: u32 = 50;

#[derive(Debug, Default)]
pub struct PatientFilter {
    pub status: Option<PatientStatus>,
}

#[derive(Debug)]
pub struct AuditFilter {
    pub limit: u32,
    pub entity: Option<AuditEntity>,
    pub actor_id: Option<String>,
}

impl Default for AuditFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_AUDIT_LIMIT,
            entity: None,
            actor_id: None,
        }
    }
}
