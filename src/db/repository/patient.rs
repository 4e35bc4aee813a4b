use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Params, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::PatientStatus;
use crate::models::*;

use super::{format_timestamp, parse_timestamp};

const PATIENT_COLUMNS: &str = "id, full_name, age, diagnosis, start_date, medical_aid, disciplines,
     modality, auth_left, status, last_meeting_comment, social_work, doctor, psychology,
     created_at, updated_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, full_name, age, diagnosis, start_date, medical_aid, disciplines,
         modality, auth_left, status, last_meeting_comment, social_work, doctor, psychology,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            patient.id.to_string(),
            patient.full_name,
            patient.age,
            patient.diagnosis,
            patient.start_date.map(|d| d.to_string()),
            patient.medical_aid,
            patient.disciplines,
            patient.modality,
            patient.auth_left,
            patient.status.as_str(),
            patient.last_meeting_comment,
            patient.social_work,
            patient.doctor,
            patient.psychology,
            format_timestamp(&patient.created_at),
            format_timestamp(&patient.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    query_one(
        conn,
        &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
        params![id.to_string()],
    )
}

/// First patient (oldest) whose name and status match exactly.
///
/// Two different people sharing a name and cohort are indistinguishable here;
/// the import relies on this lookup as its identity rule.
pub fn find_patient_by_identity(
    conn: &Connection,
    full_name: &str,
    status: &PatientStatus,
) -> Result<Option<Patient>, DatabaseError> {
    query_one(
        conn,
        &format!(
            "SELECT {PATIENT_COLUMNS} FROM patients
             WHERE full_name = ?1 AND status = ?2
             ORDER BY created_at ASC, rowid ASC LIMIT 1"
        ),
        params![full_name, status.as_str()],
    )
}

/// Overwrite the mutable fields of a patient. `None` values keep the stored
/// column; `disciplines` is always written.
pub fn update_patient_import_fields(
    conn: &Connection,
    id: &Uuid,
    update: &PatientUpdate,
    updated_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE patients SET
            age = COALESCE(?2, age),
            diagnosis = COALESCE(?3, diagnosis),
            start_date = COALESCE(?4, start_date),
            medical_aid = COALESCE(?5, medical_aid),
            disciplines = ?6,
            modality = COALESCE(?7, modality),
            auth_left = COALESCE(?8, auth_left),
            last_meeting_comment = COALESCE(?9, last_meeting_comment),
            social_work = COALESCE(?10, social_work),
            doctor = COALESCE(?11, doctor),
            psychology = COALESCE(?12, psychology),
            updated_at = ?13
         WHERE id = ?1",
        params![
            id.to_string(),
            update.age,
            update.diagnosis,
            update.start_date.map(|d| d.to_string()),
            update.medical_aid,
            update.disciplines,
            update.modality,
            update.auth_left,
            update.last_meeting_comment,
            update.social_work,
            update.doctor,
            update.psychology,
            format_timestamp(updated_at),
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Replace the stored disciplines of one patient.
pub fn update_patient_disciplines(
    conn: &Connection,
    id: &Uuid,
    disciplines: &str,
    updated_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE patients SET disciplines = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), disciplines, format_timestamp(updated_at)],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Patients, newest first, optionally restricted to one cohort.
pub fn list_patients(
    conn: &Connection,
    filter: &PatientFilter,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients
         WHERE (?1 IS NULL OR status = ?1)
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt
        .query_map(params![filter.status.map(|s| s.as_str())], read_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(patient_from_row).collect()
}

pub fn count_patients(
    conn: &Connection,
    status: Option<&PatientStatus>,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE (?1 IS NULL OR status = ?1)",
        params![status.map(|s| s.as_str())],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

fn query_one<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    match stmt.query_row(params, read_row) {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct PatientRow {
    id: String,
    full_name: String,
    age: Option<i64>,
    diagnosis: Option<String>,
    start_date: Option<String>,
    medical_aid: Option<String>,
    disciplines: String,
    modality: Option<String>,
    auth_left: Option<String>,
    status: String,
    last_meeting_comment: Option<String>,
    social_work: Option<String>,
    doctor: Option<String>,
    psychology: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        age: row.get(2)?,
        diagnosis: row.get(3)?,
        start_date: row.get(4)?,
        medical_aid: row.get(5)?,
        disciplines: row.get(6)?,
        modality: row.get(7)?,
        auth_left: row.get(8)?,
        status: row.get(9)?,
        last_meeting_comment: row.get(10)?,
        social_work: row.get(11)?,
        doctor: row.get(12)?,
        psychology: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        full_name: row.full_name,
        age: row.age,
        diagnosis: row.diagnosis,
        start_date: row
            .start_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        medical_aid: row.medical_aid,
        disciplines: row.disciplines,
        modality: row.modality,
        auth_left: row.auth_left,
        status: PatientStatus::from_str(&row.status)?,
        last_meeting_comment: row.last_meeting_comment,
        social_work: row.social_work,
        doctor: row.doctor,
        psychology: row.psychology,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}
