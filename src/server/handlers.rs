use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse, Response},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing::{error, info, warn};

use super::{AppState, pages};
use crate::{color::Upload, error::AppError};

pub async fn index() -> Html<&'static str> {
    Html(pages::INDEX_PAGE)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = read_upload(&mut multipart).await.inspect_err(|e| {
        warn!("Rejected upload: {}", e);
    })?;
    let id = upload.id;
    info!("Analyzing upload {:?}: {}", id, upload.filename);

    let analysis = state
        .summarizer
        .clone()
        .oneshot(upload)
        .await
        .inspect_err(|e| error!("Upload {:?} failed: {}", id, e))?;

    // the row only commits once the csv copy is written
    let pending = state
        .store
        .stage(&analysis.filename, &analysis.summary)
        .await
        .inspect_err(|e| error!("Failed to store upload {:?}: {}", id, e))?;
    state
        .csv_log
        .append(pending.record())
        .await
        .inspect_err(|e| error!("Failed to log upload {:?} to csv: {}", id, e))?;
    let record = pending
        .commit()
        .await
        .inspect_err(|e| error!("Failed to commit upload {:?}: {}", id, e))?;

    info!("Upload {:?} averaged to {}", id, record.hex);

    if wants_json(&headers) {
        Ok(Json(record).into_response())
    } else {
        Ok(Html(pages::result_page(&record)).into_response())
    }
}

pub async fn history(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let items = state.store.recent(state.history_limit).await?;
    Ok(Json(json!({ "count": items.len(), "items": items })))
}

pub async fn download_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    let contents = state.csv_log.contents().await?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"results.csv\""),
        ),
    ];
    Ok((headers, contents).into_response())
}

/// Pulls the `file` field out of the form; a field without a filename
/// counts as no upload at all.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(AppError::MissingUpload),
        };
        let bytes = field.bytes().await?;
        return Ok(Upload::new(filename, bytes.to_vec()));
    }
    Err(AppError::MissingUpload)
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}
