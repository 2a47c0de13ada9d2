use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use common::validation::Violations;
use serde::{Deserialize, Serialize};

use crate::entity::csv;
use crate::error::AppError;

/// Body for the dataset endpoints that address rows by key.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DatasetKeyRequest {
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    #[schema(example = "9b2f4c1e-0a7d-4e55-8f3b-6c2d1e0f9a87")]
    pub csv_id: String,
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    #[schema(example = "3f0e6a52-8c1d-4b7e-9a43-0d7f2c1e5b90")]
    pub user_id: String,
}

pub fn validate_owner(payload: &DatasetKeyRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("user_id", &payload.user_id);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_csv_id(payload: &DatasetKeyRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("csv_id", &payload.csv_id);
    v.finish().map_err(AppError::MalformedInput)
}

/// Shape counts reported by the client alongside an upload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DatasetShape {
    pub data_size: i32,
    pub data_columns: i32,
    pub data_rows: i32,
}

/// Decoded `multipart/form-data` body of an upload or update.
#[derive(Debug, Default, Clone)]
pub struct DatasetForm {
    pub csv_file: Option<Vec<u8>>,
    pub json_file: Option<Vec<u8>>,
    pub csv_id: String,
    pub user_id: String,
    pub file_name: String,
    pub data_size: String,
    pub data_columns: String,
    pub data_rows: String,
}

/// OpenAPI shape of the multipart dataset form.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct DatasetFormSchema {
    #[schema(value_type = String, format = Binary)]
    csv_file: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    json_file: Vec<u8>,
    csv_id: String,
    /// Upload only.
    user_id: Option<String>,
    /// Upload only.
    file_name: Option<String>,
    data_size: Option<i32>,
    data_columns: Option<i32>,
    data_rows: Option<i32>,
}

/// A validated upload, ready to insert.
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub csv_id: String,
    pub user_id: String,
    pub file_name: String,
    pub csv_file: Vec<u8>,
    pub json_file: Vec<u8>,
    pub shape: DatasetShape,
}

/// A validated replacement payload for an existing dataset.
#[derive(Debug, Clone)]
pub struct DatasetReplacement {
    pub csv_id: String,
    pub csv_file: Vec<u8>,
    pub json_file: Vec<u8>,
    pub shape: DatasetShape,
}

impl DatasetForm {
    fn check_files(&self, v: &mut Violations) {
        if self.csv_file.is_none() {
            v.push("csv_file is required");
        }
        if self.json_file.is_none() {
            v.push("json_file is required");
        }
    }

    fn shape(&self, v: &mut Violations) -> DatasetShape {
        DatasetShape {
            data_size: parse_count(v, "data_size", &self.data_size),
            data_columns: parse_count(v, "data_columns", &self.data_columns),
            data_rows: parse_count(v, "data_rows", &self.data_rows),
        }
    }

    pub fn into_new_dataset(self) -> Result<NewDataset, AppError> {
        let mut v = Violations::new();
        self.check_files(&mut v);
        v.require("csv_id", &self.csv_id)
            .require("user_id", &self.user_id)
            .require("file_name", &self.file_name);
        let shape = self.shape(&mut v);
        v.finish().map_err(AppError::MalformedInput)?;

        Ok(NewDataset {
            csv_id: self.csv_id.trim().to_string(),
            user_id: self.user_id.trim().to_string(),
            file_name: self.file_name.trim().to_string(),
            csv_file: self.csv_file.unwrap_or_default(),
            json_file: self.json_file.unwrap_or_default(),
            shape,
        })
    }

    pub fn into_replacement(self) -> Result<DatasetReplacement, AppError> {
        let mut v = Violations::new();
        self.check_files(&mut v);
        v.require("csv_id", &self.csv_id);
        let shape = self.shape(&mut v);
        v.finish().map_err(AppError::MalformedInput)?;

        Ok(DatasetReplacement {
            csv_id: self.csv_id.trim().to_string(),
            csv_file: self.csv_file.unwrap_or_default(),
            json_file: self.json_file.unwrap_or_default(),
            shape,
        })
    }
}

/// Absent counts are zero; anything present must be a non-negative integer.
fn parse_count(v: &mut Violations, field: &str, raw: &str) -> i32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    match raw.parse::<i32>() {
        Ok(n) if n >= 0 => n,
        Ok(_) => {
            v.push(format!("{field} must be >= 0"));
            0
        }
        Err(_) => {
            v.push(format!("{field} must be an integer"));
            0
        }
    }
}

/// Metadata of a live dataset, as listed on the management screen.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CsvSummary {
    pub csv_id: String,
    pub file_name: String,
    pub data_size: i32,
    pub data_columns: i32,
    pub data_rows: i32,
    pub last_accessed_date: DateTime<Utc>,
}

impl From<csv::Model> for CsvSummary {
    fn from(model: csv::Model) -> Self {
        Self {
            csv_id: model.csv_id,
            file_name: model.file_name,
            data_size: model.data_size,
            data_columns: model.data_columns,
            data_rows: model.data_rows,
            last_accessed_date: model.last_accessed_date,
        }
    }
}

/// Metadata of a soft-deleted dataset.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeletedCsv {
    pub csv_id: String,
    pub user_id: String,
    pub file_name: String,
    pub data_size: i32,
    pub data_columns: i32,
    pub data_rows: i32,
    pub upload_date: DateTime<Utc>,
    pub last_accessed_date: DateTime<Utc>,
    pub is_delete: bool,
}

impl From<csv::Model> for DeletedCsv {
    fn from(model: csv::Model) -> Self {
        Self {
            csv_id: model.csv_id,
            user_id: model.user_id,
            file_name: model.file_name,
            data_size: model.data_size,
            data_columns: model.data_columns,
            data_rows: model.data_rows,
            upload_date: model.upload_date,
            last_accessed_date: model.last_accessed_date,
            is_delete: model.is_delete,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CsvListResponse {
    #[serde(rename = "CsvData")]
    pub csv_data: Vec<CsvSummary>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeletedCsvListResponse {
    #[serde(rename = "DeleteFiles")]
    pub delete_files: Vec<DeletedCsv>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = "Upload successful")]
    pub message: String,
    pub csv_id: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UpdateResponse {
    pub file_name: String,
}

/// Both stored payloads, base64-encoded.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CsvFiles {
    pub csv_file: String,
    pub json_file: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CsvFileResponse {
    pub file: CsvFiles,
}

impl From<csv::Model> for CsvFileResponse {
    fn from(model: csv::Model) -> Self {
        Self {
            file: CsvFiles {
                csv_file: STANDARD.encode(&model.csv_file),
                json_file: STANDARD.encode(&model.json_file),
            },
        }
    }
}
