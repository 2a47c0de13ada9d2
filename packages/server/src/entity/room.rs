use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A chat session bound to one visualization of one dataset.
///
/// `(csv_id, visualization_type, vertical, horizontal, target, regression)`
/// identifies the room; a unique index over the tuple is created at startup.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub room_id: String,
    pub csv_id: String,
    pub visualization_type: String,
    pub vertical: String,
    pub horizontal: String,
    pub target: String,
    pub regression: String,
}

impl ActiveModelBehavior for ActiveModel {}
