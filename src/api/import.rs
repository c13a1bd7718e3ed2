//! Spreadsheet import endpoints

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{ApiError, ApiResult, AppState};
use crate::import::{self, ImportReport, TEMPLATE_CSV_FILE_NAME, TEMPLATE_FILE_NAME};

const FILE_FIELD: &str = "file";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn import_categories(State(s): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<ImportReport>> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            info!(file_name = field.file_name().unwrap_or("-"), "import upload received");
            file = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = file.ok_or_else(|| ApiError::BadRequest("Aucun fichier fourni".into()))?;
    if bytes.len() > s.import_max_bytes {
        return Err(ApiError::PayloadTooLarge("Fichier trop volumineux".into()));
    }

    let run = import::import_sheet(s.store.as_ref(), &bytes).await?;

    let publisher = s.publisher.clone();
    let events = run.events;
    tokio::spawn(async move { publisher.publish_all(&events).await });

    Ok(Json(run.report))
}

#[derive(Debug, Deserialize)] pub struct TemplateParams { pub format: Option<String> }

/// Workbook by default, CSV with `?format=csv`.
pub async fn download_template(Query(p): Query<TemplateParams>) -> ApiResult<impl IntoResponse> {
    let (content_type, file_name, bytes) = match p.format.as_deref() {
        Some("csv") => ("text/csv; charset=utf-8", TEMPLATE_CSV_FILE_NAME, import::template_csv()),
        None | Some("xlsx") => (XLSX_CONTENT_TYPE, TEMPLATE_FILE_NAME, import::template_xlsx()),
        Some(other) => return Err(ApiError::BadRequest(format!("Format de modèle inconnu : {other}"))),
    };
    let bytes = bytes.map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        bytes,
    ))
}
