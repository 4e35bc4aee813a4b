//! Spreadsheet upload endpoint.
//!
//! `POST /api/import`: multipart form with a `file` field holding the
//! workbook and an optional `intent` field (`preview` or `import`).
//! Decoding and persistence run on the blocking pool.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext, ImportIntent, ImportResponse};
use crate::core_state::{CoreError, CoreState};
use crate::pipeline::import::{validate_upload, ImportCoordinator, SqlitePatientStore};

pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut intent = ImportIntent::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(bytes.to_vec());
            }
            "intent" => {
                let raw = field.text().await.map_err(multipart_error)?;
                intent = raw.parse()?;
            }
            _ => {}
        }
    }

    let bytes = file.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;
    validate_upload(&bytes, ctx.core.import.max_upload_bytes)?;

    tracing::info!(
        size_bytes = bytes.len(),
        ?intent,
        actor_id = %actor.actor_id,
        "Workbook upload received"
    );

    let core = Arc::clone(&ctx.core);
    let response = tokio::task::spawn_blocking(move || {
        run_import(&core, &bytes, intent, &actor.actor_id)
    })
    .await
    .map_err(|e| CoreError::TaskJoin(e.to_string()))??;

    Ok(Json(response))
}

/// Parse the workbook, then either return a truncated preview or persist
/// every accepted row.
fn run_import(
    core: &CoreState,
    bytes: &[u8],
    intent: ImportIntent,
    actor_id: &str,
) -> Result<ImportResponse, ApiError> {
    let parsed = core.reader().parse_workbook(bytes)?;

    match intent {
        ImportIntent::Preview => {
            let preview = parsed.truncated(core.import.preview_rows);
            Ok(ImportResponse::Preview {
                sheets: preview.sheets,
                summary: preview.summary,
            })
        }
        ImportIntent::Import => {
            let records = parsed.records();
            let _import = core.lock_imports();
            let conn = core.open_db()?;
            let coordinator =
                ImportCoordinator::new(&SqlitePatientStore, core.audit(), core.import.batch_size);
            let result = coordinator.import_patients(&conn, &records, actor_id);
            core.flush_audit(&conn);
            Ok(ImportResponse::Import {
                summary: parsed.summary,
                result,
            })
        }
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
