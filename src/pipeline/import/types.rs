use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::PatientStatus;
use crate::models::{Patient, PatientUpdate};

/// A normalized, not yet persisted patient row read from a workbook.
///
/// Identity is (`full_name`, `status`). `disciplines` is the stored JSON
/// array string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePatient {
    pub full_name: String,
    pub status: PatientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_aid: Option<String>,
    pub disciplines: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_meeting_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psychology: Option<String>,
}

impl CandidatePatient {
    pub fn new(full_name: impl Into<String>, status: PatientStatus) -> Self {
        Self {
            full_name: full_name.into(),
            status,
            age: None,
            diagnosis: None,
            start_date: None,
            medical_aid: None,
            disciplines: "[]".into(),
            modality: None,
            auth_left: None,
            last_meeting_comment: None,
            social_work: None,
            doctor: None,
            psychology: None,
        }
    }

    /// A new patient row built from this record.
    pub fn to_patient(&self, id: Uuid, now: NaiveDateTime) -> Patient {
        Patient {
            id,
            full_name: self.full_name.clone(),
            age: self.age,
            diagnosis: self.diagnosis.clone(),
            start_date: self.start_date,
            medical_aid: self.medical_aid.clone(),
            disciplines: self.disciplines.clone(),
            modality: self.modality.clone(),
            auth_left: self.auth_left.clone(),
            status: self.status,
            last_meeting_comment: self.last_meeting_comment.clone(),
            social_work: self.social_work.clone(),
            doctor: self.doctor.clone(),
            psychology: self.psychology.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The mutable fields written when this record refreshes an existing patient.
    pub fn to_update(&self) -> PatientUpdate {
        PatientUpdate {
            age: self.age,
            diagnosis: self.diagnosis.clone(),
            start_date: self.start_date,
            medical_aid: self.medical_aid.clone(),
            disciplines: self.disciplines.clone(),
            modality: self.modality.clone(),
            auth_left: self.auth_left.clone(),
            last_meeting_comment: self.last_meeting_comment.clone(),
            social_work: self.social_work.clone(),
            doctor: self.doctor.clone(),
            psychology: self.psychology.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSheet {
    pub name: String,
    pub status: PatientStatus,
    pub rows: Vec<CandidatePatient>,
    /// Accepted rows. Unaffected by preview truncation of `rows`.
    pub total_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Recognized sheets only.
    pub total_sheets: usize,
    pub total_rows: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub sheets: Vec<ParsedSheet>,
    pub summary: ImportSummary,
}

impl ImportPreview {
    /// Keep at most `limit` rows per sheet for display.
    pub fn truncated(mut self, limit: usize) -> Self {
        for sheet in &mut self.sheets {
            sheet.rows.truncate(limit);
        }
        self
    }

    /// Every accepted record, sheet by sheet in workbook order.
    pub fn records(&self) -> Vec<CandidatePatient> {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.rows.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub imported: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

impl Default for ImportResult {
    fn default() -> Self {
        Self {
            success: true,
            imported: 0,
            updated: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }
}
