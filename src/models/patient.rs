use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PatientStatus;

/// A persisted patient. `disciplines` holds a JSON array string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub age: Option<i64>,
    pub diagnosis: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub medical_aid: Option<String>,
    pub disciplines: String,
    pub modality: Option<String>,
    pub auth_left: Option<String>,
    pub status: PatientStatus,
    pub last_meeting_comment: Option<String>,
    pub social_work: Option<String>,
    pub doctor: Option<String>,
    pub psychology: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Mutable, non-identity fields written when an existing patient is
/// refreshed. A `None` leaves the stored column as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientUpdate {
    pub age: Option<i64>,
    pub diagnosis: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub medical_aid: Option<String>,
    pub disciplines: String,
    pub modality: Option<String>,
    pub auth_left: Option<String>,
    pub last_meeting_comment: Option<String>,
    pub social_work: Option<String>,
    pub doctor: Option<String>,
    pub psychology: Option<String>,
}
