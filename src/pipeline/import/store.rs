use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::PatientStatus;
use crate::models::Patient;

use super::traits::PatientStore;
use super::types::CandidatePatient;

/// SQLite-backed patient store over the repository layer.
pub struct SqlitePatientStore;

impl PatientStore for SqlitePatientStore {
    /// Each batch takes the write lock up front (`BEGIN IMMEDIATE`) so a
    /// concurrent writer waits out `busy_timeout` instead of failing every
    /// statement on a lock upgrade.
    fn in_transaction(
        &self,
        conn: &Connection,
        work: &mut dyn FnMut(&Connection),
    ) -> Result<(), DatabaseError> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        work(&tx);
        tx.commit()?;
        Ok(())
    }

    fn find_one(
        &self,
        conn: &Connection,
        full_name: &str,
        status: &PatientStatus,
    ) -> Result<Option<Patient>, DatabaseError> {
        repository::find_patient_by_identity(conn, full_name, status)
    }

    fn create(&self, conn: &Connection, record: &CandidatePatient) -> Result<Patient, DatabaseError> {
        let patient = record.to_patient(Uuid::new_v4(), Utc::now().naive_utc());
        repository::insert_patient(conn, &patient)?;
        Ok(patient)
    }

    fn update(
        &self,
        conn: &Connection,
        id: &Uuid,
        record: &CandidatePatient,
    ) -> Result<(), DatabaseError> {
        repository::update_patient_import_fields(
            conn,
            id,
            &record.to_update(),
            &Utc::now().naive_utc(),
        )
    }
}
