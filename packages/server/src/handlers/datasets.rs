use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use common::{LifecycleEvent, LifecycleFilter};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::multipart::DatasetMultipart;
use crate::models::dataset::*;
use crate::models::shared::{Empty, Envelope, SuccessResponse};
use crate::state::AppState;
use crate::store::DatasetStore;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Datasets",
    operation_id = "uploadCsv",
    summary = "Upload a dataset",
    description = "Multipart form with parts `csv_file`, `json_file`, `csv_id`, `user_id`, `file_name`, `data_size`, `data_columns` and `data_rows`. Absent counts are stored as 0.",
    request_body(content = DatasetFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Dataset stored", body = UploadResponse),
        (status = 400, description = "Invalid form (MalformedInput) or csv_id taken (IntegrityViolation)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(csv_id = %form.csv_id, user_id = %form.user_id))]
pub async fn upload_csv(
    State(state): State<AppState>,
    DatasetMultipart(form): DatasetMultipart,
) -> Result<Envelope<UploadResponse>, AppError> {
    let dataset = form.into_new_dataset()?;

    let model = DatasetStore::new(&state.db).insert(dataset).await?;
    Ok(Envelope::success(UploadResponse {
        message: "Upload successful".into(),
        csv_id: model.csv_id,
    }))
}

#[utoipa::path(
    post,
    path = "/update",
    tag = "Datasets",
    operation_id = "updateCsv",
    summary = "Replace a dataset's payload",
    description = "Multipart form with parts `csv_file`, `json_file`, `csv_id` and the three counts. The id, owner, file name and upload date are kept.",
    request_body(content = DatasetFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Dataset replaced", body = UpdateResponse),
        (status = 400, description = "Invalid form (MalformedInput)", body = ErrorBody),
        (status = 404, description = "Dataset missing or deleted (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(csv_id = %form.csv_id))]
pub async fn update_csv(
    State(state): State<AppState>,
    DatasetMultipart(form): DatasetMultipart,
) -> Result<Envelope<UpdateResponse>, AppError> {
    let replacement = form.into_replacement()?;

    let model = DatasetStore::new(&state.db).replace(replacement).await?;
    Ok(Envelope::success(UpdateResponse {
        file_name: model.file_name,
    }))
}

#[utoipa::path(
    post,
    path = "/list",
    tag = "Datasets",
    operation_id = "listCsvs",
    summary = "List a user's live datasets",
    description = "Most recently accessed first. Payloads are not included.",
    request_body = DatasetKeyRequest,
    responses(
        (status = 200, description = "Live datasets", body = CsvListResponse),
        (status = 400, description = "Missing user_id (MalformedInput)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn list_csvs(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DatasetKeyRequest>,
) -> Result<Envelope<CsvListResponse>, AppError> {
    validate_owner(&payload)?;

    let rows = DatasetStore::new(&state.db)
        .list(&payload.user_id, LifecycleFilter::Live)
        .await?;
    Ok(Envelope::success(CsvListResponse {
        csv_data: rows.into_iter().map(CsvSummary::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/list-deleted",
    tag = "Datasets",
    operation_id = "listDeletedCsvs",
    summary = "List a user's soft-deleted datasets",
    request_body = DatasetKeyRequest,
    responses(
        (status = 200, description = "Deleted datasets", body = DeletedCsvListResponse),
        (status = 400, description = "Missing user_id (MalformedInput)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn list_deleted_csvs(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DatasetKeyRequest>,
) -> Result<Envelope<DeletedCsvListResponse>, AppError> {
    validate_owner(&payload)?;

    let rows = DatasetStore::new(&state.db)
        .list(&payload.user_id, LifecycleFilter::Deleted)
        .await?;
    Ok(Envelope::success(DeletedCsvListResponse {
        delete_files: rows.into_iter().map(DeletedCsv::from).collect(),
    }))
}

async fn apply_event(
    state: &AppState,
    payload: &DatasetKeyRequest,
    event: LifecycleEvent,
) -> Result<Envelope<Empty>, AppError> {
    validate_csv_id(payload)?;

    DatasetStore::new(&state.db)
        .transition(&payload.csv_id, event)
        .await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/delete",
    tag = "Datasets",
    operation_id = "deleteCsv",
    summary = "Soft-delete a dataset",
    request_body = DatasetKeyRequest,
    responses(
        (status = 200, description = "Dataset deleted", body = SuccessResponse),
        (status = 400, description = "Missing csv_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "Dataset missing or already deleted (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(csv_id = %payload.csv_id))]
pub async fn delete_csv(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DatasetKeyRequest>,
) -> Result<Envelope<Empty>, AppError> {
    apply_event(&state, &payload, LifecycleEvent::Delete).await
}

#[utoipa::path(
    post,
    path = "/restore",
    tag = "Datasets",
    operation_id = "restoreCsv",
    summary = "Restore a soft-deleted dataset",
    request_body = DatasetKeyRequest,
    responses(
        (status = 200, description = "Dataset restored", body = SuccessResponse),
        (status = 400, description = "Missing csv_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "Dataset missing or not deleted (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(csv_id = %payload.csv_id))]
pub async fn restore_csv(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DatasetKeyRequest>,
) -> Result<Envelope<Empty>, AppError> {
    apply_event(&state, &payload, LifecycleEvent::Restore).await
}

#[utoipa::path(
    post,
    path = "/delete/permanently",
    tag = "Datasets",
    operation_id = "purgeCsv",
    summary = "Permanently delete a dataset",
    description = "Works on live and deleted datasets alike. Rooms and chats referring to the dataset are kept.",
    request_body = DatasetKeyRequest,
    responses(
        (status = 200, description = "Dataset removed", body = SuccessResponse),
        (status = 400, description = "Missing csv_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "Dataset not found (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(csv_id = %payload.csv_id))]
pub async fn purge_csv(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DatasetKeyRequest>,
) -> Result<Envelope<Empty>, AppError> {
    apply_event(&state, &payload, LifecycleEvent::PermanentDelete).await
}

#[utoipa::path(
    get,
    path = "/{csv_id}",
    tag = "Datasets",
    operation_id = "getCsv",
    summary = "Fetch a dataset's payloads",
    description = "Both files are returned base64-encoded.",
    params(("csv_id" = String, Path, description = "Dataset ID")),
    responses(
        (status = 200, description = "Dataset payloads", body = CsvFileResponse),
        (status = 404, description = "Dataset missing or deleted (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_csv(
    State(state): State<AppState>,
    Path(csv_id): Path<String>,
) -> Result<Envelope<CsvFileResponse>, AppError> {
    let model = DatasetStore::new(&state.db)
        .find(&csv_id, LifecycleFilter::Live)
        .await?;
    Ok(Envelope::success(CsvFileResponse::from(model)))
}

#[utoipa::path(
    get,
    path = "/{csv_id}/download",
    tag = "Datasets",
    operation_id = "downloadCsv",
    summary = "Download the raw CSV",
    params(("csv_id" = String, Path, description = "Dataset ID")),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = Vec<u8>),
        (status = 404, description = "Dataset missing or deleted (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn download_csv(
    State(state): State<AppState>,
    Path(csv_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let model = DatasetStore::new(&state.db)
        .find(&csv_id, LifecycleFilter::Live)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_name(&model.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        model.csv_file,
    ))
}

/// File name safe to place in a quoted `Content-Disposition` parameter.
fn attachment_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    if cleaned.trim().is_empty() {
        "dataset.csv".to_string()
    } else {
        cleaned
    }
}
