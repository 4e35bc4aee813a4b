//! Batched find-or-create of candidate records.
//!
//! Records are written in consecutive batches, one transaction per batch.
//! A failing record is counted and reported but does not abort its batch;
//! only a transaction that cannot commit marks the whole import unsuccessful.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{AuditAction, AuditEntity, PatientStatus};
use crate::models::AuditLog;

use super::traits::{AuditSink, PatientStore};
use super::types::{CandidatePatient, ImportResult, RowError};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Value of `source` in the metadata of import audit entries.
pub const AUDIT_SOURCE: &str = "spreadsheet_import";

pub struct ImportCoordinator<'a> {
    store: &'a dyn PatientStore,
    audit: &'a dyn AuditSink,
    batch_size: usize,
}

enum Upsert {
    Created(Uuid),
    Updated,
}

/// Per-record outcomes captured inside one batch transaction.
#[derive(Default)]
struct BatchOutcome {
    created: Vec<(Uuid, PatientStatus)>,
    updated: usize,
    failures: Vec<RowError>,
}

impl<'a> ImportCoordinator<'a> {
    pub fn new(store: &'a dyn PatientStore, audit: &'a dyn AuditSink, batch_size: usize) -> Self {
        Self {
            store,
            audit,
            batch_size: batch_size.max(1),
        }
    }

    /// Persist `records` on behalf of `actor_id`.
    ///
    /// Reported rows are 1-based positions in `records`; a failed batch is
    /// reported at its 0-based start offset.
    pub fn import_patients(
        &self,
        conn: &Connection,
        records: &[CandidatePatient],
        actor_id: &str,
    ) -> ImportResult {
        let mut result = ImportResult::default();

        for (index, batch) in records.chunks(self.batch_size).enumerate() {
            let offset = index * self.batch_size;
            let mut outcome = BatchOutcome::default();

            let committed = self.store.in_transaction(conn, &mut |tx| {
                for (i, record) in batch.iter().enumerate() {
                    match self.upsert(tx, record) {
                        Ok(Upsert::Created(id)) => outcome.created.push((id, record.status)),
                        Ok(Upsert::Updated) => outcome.updated += 1,
                        Err(e) => outcome.failures.push(RowError {
                            row: offset + i + 1,
                            error: e.to_string(),
                        }),
                    }
                }
            });

            result.failed += outcome.failures.len();
            result.errors.append(&mut outcome.failures);

            match committed {
                Ok(()) => {
                    tracing::info!(
                        batch = index + 1,
                        created = outcome.created.len(),
                        updated = outcome.updated,
                        "Import batch committed"
                    );
                    result.imported += outcome.created.len();
                    result.updated += outcome.updated;
                    for (id, status) in outcome.created {
                        self.audit.record(AuditLog::new(
                            Some(actor_id.to_string()),
                            AuditEntity::Patient,
                            id.to_string(),
                            AuditAction::Import,
                            Some(serde_json::json!({
                                "source": AUDIT_SOURCE,
                                "status": status,
                            })),
                        ));
                    }
                }
                Err(e) => {
                    tracing::warn!(batch = index + 1, offset, error = %e, "Import batch failed");
                    result.success = false;
                    result.errors.push(RowError {
                        row: offset,
                        error: format!("Batch failed: {e}"),
                    });
                }
            }
        }

        tracing::info!(
            total = records.len(),
            imported = result.imported,
            updated = result.updated,
            failed = result.failed,
            success = result.success,
            "Patient import finished"
        );
        result
    }

    fn upsert(&self, conn: &Connection, record: &CandidatePatient) -> Result<Upsert, DatabaseError> {
        match self.store.find_one(conn, &record.full_name, &record.status)? {
            Some(existing) => {
                self.store.update(conn, &existing.id, record)?;
                Ok(Upsert::Updated)
            }
            None => {
                let created = self.store.create(conn, record)?;
                Ok(Upsert::Created(created.id))
            }
        }
    }
}
