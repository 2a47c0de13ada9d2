use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "csv")]
pub struct Model {
    /// Client-generated opaque ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub csv_id: String,

    /// Raw uploaded CSV.
    #[serde(skip)]
    pub csv_file: Vec<u8>,
    /// JSON artifact the client derives from the CSV.
    #[serde(skip)]
    pub json_file: Vec<u8>,

    pub user_id: String,
    pub file_name: String,
    pub data_size: i32,
    pub data_columns: i32,
    pub data_rows: i32,

    pub upload_date: DateTimeUtc,
    pub last_accessed_date: DateTimeUtc,

    pub is_delete: bool,
}

impl ActiveModelBehavior for ActiveModel {}
