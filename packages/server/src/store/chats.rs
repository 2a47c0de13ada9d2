use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select,
    Set, SqlErr, TransactionSession, TransactionTrait,
};

use crate::entity::{chat, room};
use crate::error::AppError;
use crate::models::chat::{ChatRequest, RoomKey};

pub struct ChatStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> ChatStore<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Bind `room_id` to the tuple, or return the room already bound to it.
    pub async fn save_room(&self, room_id: String, key: RoomKey) -> Result<room::Model, AppError> {
        if let Some(existing) = self.find_room(&key).await? {
            tracing::debug!(room_id = %existing.room_id, "Room already exists for tuple");
            return Ok(existing);
        }

        let model = room::ActiveModel {
            room_id: Set(room_id),
            csv_id: Set(key.csv_id.clone()),
            visualization_type: Set(key.visualization_type.clone()),
            vertical: Set(key.vertical.clone()),
            horizontal: Set(key.horizontal.clone()),
            target: Set(key.target.clone()),
            regression: Set(key.regression.clone()),
        };

        match model.insert(self.conn).await {
            Ok(inserted) => {
                tracing::info!(room_id = %inserted.room_id, csv_id = %inserted.csv_id, "Room created");
                Ok(inserted)
            }
            // A concurrent save bound the tuple first; that room wins.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                match self.find_room(&key).await? {
                    Some(existing) => Ok(existing),
                    None => Err(AppError::from(e)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_room(&self, key: &RoomKey) -> Result<Option<room::Model>, AppError> {
        Ok(room_by_key(key)
            .order_by_asc(room::Column::RoomId)
            .one(self.conn)
            .await?)
    }

    pub async fn save_message(&self, message: ChatRequest) -> Result<chat::Model, AppError> {
        let room_exists = room::Entity::find_by_id(message.room_id.clone())
            .one(self.conn)
            .await?
            .is_some();
        if !room_exists {
            return Err(AppError::NotFound("Room not found".into()));
        }

        let model = chat::ActiveModel {
            chat_id: Set(message.chat_id),
            room_id: Set(message.room_id),
            message: Set(message.message),
            post_id: Set(message.post_id),
            user_chat: Set(message.user_chat),
        };
        Ok(model.insert(self.conn).await?)
    }

    /// Messages of a room in `post_id` order.
    pub async fn history(&self, room_id: &str) -> Result<Vec<chat::Model>, AppError> {
        Ok(chat::Entity::find()
            .filter(chat::Column::RoomId.eq(room_id))
            .order_by_asc(chat::Column::PostId)
            .order_by_asc(chat::Column::ChatId)
            .all(self.conn)
            .await?)
    }

    /// Delete a room together with all of its messages.
    pub async fn reset(&self, room_id: &str) -> Result<u64, AppError> {
        let txn = self.conn.begin().await?;

        let room_exists = room::Entity::find_by_id(room_id.to_string())
            .one(&txn)
            .await?
            .is_some();
        if !room_exists {
            return Err(AppError::NotFound("Room not found".into()));
        }

        let messages = chat::Entity::delete_many()
            .filter(chat::Column::RoomId.eq(room_id))
            .exec(&txn)
            .await?
            .rows_affected;
        room::Entity::delete_by_id(room_id.to_string())
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(room_id, messages, "Room reset");
        Ok(messages)
    }
}

fn room_by_key(key: &RoomKey) -> Select<room::Entity> {
    room::Entity::find()
        .filter(room::Column::CsvId.eq(key.csv_id.as_str()))
        .filter(room::Column::VisualizationType.eq(key.visualization_type.as_str()))
        .filter(room::Column::Vertical.eq(key.vertical.as_str()))
        .filter(room::Column::Horizontal.eq(key.horizontal.as_str()))
        .filter(room::Column::Target.eq(key.target.as_str()))
        .filter(room::Column::Regression.eq(key.regression.as_str()))
}
