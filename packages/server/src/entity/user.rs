use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// Client-generated opaque ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// Unique among live rows only; see `seed::ensure_indexes`.
    pub mail_address: String,

    /// argon2 PHC digest.
    #[serde(skip_serializing)]
    pub password: String,

    /// Empty when unset.
    #[serde(skip_serializing)]
    pub gemini_api_key: String,

    pub is_delete: bool,
}

impl ActiveModelBehavior for ActiveModel {}
