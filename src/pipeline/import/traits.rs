//! Collaborator seams of the import coordinator.
//!
//! - PatientStore: identity lookup and writes, grouped into transactions
//! - AuditSink: fire-and-forget audit trail for created patients

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::PatientStatus;
use crate::models::{AuditLog, Patient};

use super::types::CandidatePatient;

/// Patient persistence. Every call runs on the connection it is given,
/// which inside `in_transaction` is the open transaction.
pub trait PatientStore: Send + Sync {
    /// Run `work` inside a single transaction and commit it. An error here
    /// means nothing `work` wrote can be assumed persisted.
    fn in_transaction(
        &self,
        conn: &Connection,
        work: &mut dyn FnMut(&Connection),
    ) -> Result<(), DatabaseError>;

    /// First patient whose name and status both match exactly.
    fn find_one(
        &self,
        conn: &Connection,
        full_name: &str,
        status: &PatientStatus,
    ) -> Result<Option<Patient>, DatabaseError>;

    fn create(&self, conn: &Connection, record: &CandidatePatient) -> Result<Patient, DatabaseError>;

    /// Overwrite the mutable fields of `id` from `record`. Name and status
    /// are never changed.
    fn update(
        &self,
        conn: &Connection,
        id: &Uuid,
        record: &CandidatePatient,
    ) -> Result<(), DatabaseError>;
}

/// Receives audit entries. Implementations must not fail the caller; they
/// log and drop what they cannot keep.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditLog);
}
