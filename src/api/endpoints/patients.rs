//! Patient roster endpoints.
//!
//! - `GET /api/patients?status=`: imported patients, newest first.
//! - `PUT /api/patients/:id/disciplines`: replace one patient's disciplines
//!   with `{"disciplines": [..]}` or `{"disciplines": "raw text"}`.
//!
//! Disciplines leave the API as a list, never as the stored JSON string.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::core_state::CoreError;
use crate::db::{repository, DatabaseError};
use crate::models::enums::{AuditAction, AuditEntity, PatientStatus};
use crate::models::{AuditLog, Patient, PatientFilter};
use crate::pipeline::import::{
    disciplines_from_json, disciplines_to_json, AuditSink, DisciplinesInput,
};

/// A patient as the API presents it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    pub id: Uuid,
    pub full_name: String,
    pub status: PatientStatus,
    pub age: Option<i64>,
    pub diagnosis: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub medical_aid: Option<String>,
    pub disciplines: Vec<String>,
    pub modality: Option<String>,
    pub auth_left: Option<String>,
    pub last_meeting_comment: Option<String>,
    pub social_work: Option<String>,
    pub doctor: Option<String>,
    pub psychology: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Patient> for PatientView {
    fn from(p: Patient) -> Self {
        Self {
            disciplines: disciplines_from_json(&p.disciplines),
            id: p.id,
            full_name: p.full_name,
            status: p.status,
            age: p.age,
            diagnosis: p.diagnosis,
            start_date: p.start_date,
            medical_aid: p.medical_aid,
            modality: p.modality,
            auth_left: p.auth_left,
            last_meeting_comment: p.last_meeting_comment,
            social_work: p.social_work,
            doctor: p.doctor,
            psychology: p.psychology,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PatientQuery {
    pub status: Option<String>,
}

impl PatientQuery {
    fn into_filter(self) -> Result<PatientFilter, ApiError> {
        let status = self
            .status
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse::<PatientStatus>()
                    .map_err(|_| ApiError::BadRequest(format!("Unknown patient status '{s}'")))
            })
            .transpose()?;
        Ok(PatientFilter { status })
    }
}

#[derive(Debug, Deserialize)]
pub struct DisciplinesBody {
    pub disciplines: DisciplinesInput,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<PatientView>>, ApiError> {
    let filter = query.into_filter()?;
    let core = Arc::clone(&ctx.core);

    let patients = tokio::task::spawn_blocking(move || -> Result<Vec<Patient>, ApiError> {
        let conn = core.open_db()?;
        Ok(repository::list_patients(&conn, &filter)?)
    })
    .await
    .map_err(|e| CoreError::TaskJoin(e.to_string()))??;

    Ok(Json(patients.into_iter().map(PatientView::from).collect()))
}

pub async fn set_disciplines(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<DisciplinesBody>,
) -> Result<Json<PatientView>, ApiError> {
    let id = Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid patient id '{id}'")))?;
    let stored = disciplines_to_json(&body.disciplines);
    let core = Arc::clone(&ctx.core);

    let patient = tokio::task::spawn_blocking(move || -> Result<Patient, ApiError> {
        let conn = core.open_db()?;
        repository::update_patient_disciplines(&conn, &id, &stored, &Utc::now().naive_utc())?;
        core.audit().record(AuditLog::new(
            Some(actor.actor_id.clone()),
            AuditEntity::Patient,
            id.to_string(),
            AuditAction::Update,
            Some(serde_json::json!({ "field": "disciplines" })),
        ));
        core.flush_audit(&conn);

        repository::get_patient(&conn, &id)?.ok_or_else(|| {
            DatabaseError::NotFound {
                entity_type: "Patient".into(),
                id: id.to_string(),
            }
            .into()
        })
    })
    .await
    .map_err(|e| CoreError::TaskJoin(e.to_string()))??;

    tracing::info!(patient_id = %patient.id, "Patient disciplines replaced");
    Ok(Json(patient.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_is_validated() {
        let filter = PatientQuery {
            status: Some(" HEADWAY ".into()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.status, Some(PatientStatus::Headway));

        assert!(PatientQuery::default().into_filter().unwrap().status.is_none());

        let err = PatientQuery {
            status: Some("active".into()),
        }
        .into_filter()
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn view_decodes_stored_disciplines() {
        let now = Utc::now().naive_utc();
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".into(),
            age: None,
            diagnosis: None,
            start_date: None,
            medical_aid: None,
            disciplines: r#"["OT","PT"]"#.into(),
            modality: None,
            auth_left: None,
            status: PatientStatus::Active,
            last_meeting_comment: None,
            social_work: None,
            doctor: None,
            psychology: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(PatientView::from(patient)).unwrap();
        assert_eq!(json["disciplines"], serde_json::json!(["OT", "PT"]));
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["status"], "ACTIVE");
    }
}
