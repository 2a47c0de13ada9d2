use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub chat_id: String,
    pub room_id: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// Position within the room; history is ordered by this ascending.
    pub post_id: i32,
    /// `true` for user-authored turns, `false` for system replies.
    pub user_chat: bool,
}

impl ActiveModelBehavior for ActiveModel {}
