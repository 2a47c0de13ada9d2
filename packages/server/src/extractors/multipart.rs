use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;
use crate::models::dataset::DatasetForm;

/// Decodes the `multipart/form-data` body of a dataset upload or update.
///
/// Unknown parts are skipped. Only presence is recorded here; required parts
/// and counts are validated by the caller.
pub struct DatasetMultipart(pub DatasetForm);

impl<S> FromRequest<S> for DatasetMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::MalformedInput(e.body_text()))?;

        let mut form = DatasetForm::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "csv_file" => form.csv_file = Some(bytes(field).await?),
                "json_file" => form.json_file = Some(bytes(field).await?),
                "csv_id" => form.csv_id = text(field).await?,
                "user_id" => form.user_id = text(field).await?,
                "file_name" => form.file_name = text(field).await?,
                "data_size" => form.data_size = text(field).await?,
                "data_columns" => form.data_columns = text(field).await?,
                "data_rows" => form.data_rows = text(field).await?,
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }

        Ok(DatasetMultipart(form))
    }
}

async fn bytes(field: Field<'_>) -> Result<Vec<u8>, AppError> {
    Ok(field.bytes().await.map_err(malformed)?.to_vec())
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(malformed)
}

fn malformed(err: MultipartError) -> AppError {
    AppError::MalformedInput(err.body_text())
}
