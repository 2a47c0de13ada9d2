use common::validation::Violations;
use serde::{Deserialize, Serialize};

use crate::entity::{chat, room};
use crate::error::AppError;

/// Identifies the chat session for one visualization of one dataset.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct RoomRequest {
    /// Only used when saving a room.
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    pub room_id: String,
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    pub csv_id: String,
    #[schema(example = "scatter")]
    pub visualization_type: String,
    pub vertical: String,
    pub horizontal: String,
    pub target: String,
    pub regression: String,
}

/// The tuple a room is looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomKey {
    pub csv_id: String,
    pub visualization_type: String,
    pub vertical: String,
    pub horizontal: String,
    pub target: String,
    pub regression: String,
}

impl From<RoomRequest> for RoomKey {
    fn from(req: RoomRequest) -> Self {
        Self {
            csv_id: req.csv_id,
            visualization_type: req.visualization_type,
            vertical: req.vertical,
            horizontal: req.horizontal,
            target: req.target,
            regression: req.regression,
        }
    }
}

pub fn validate_room_save(payload: &RoomRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("room_id", &payload.room_id)
        .require("csv_id", &payload.csv_id)
        .require("visualization_type", &payload.visualization_type);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_room_lookup(payload: &RoomRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("csv_id", &payload.csv_id)
        .require("visualization_type", &payload.visualization_type);
    v.finish().map_err(AppError::MalformedInput)
}

#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct RoomIdRequest {
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    pub room_id: String,
}

pub fn validate_room_id(payload: &RoomIdRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("room_id", &payload.room_id);
    v.finish().map_err(AppError::MalformedInput)
}

/// One chat turn.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ChatRequest {
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    pub chat_id: String,
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    pub room_id: String,
    pub message: String,
    /// Position within the room.
    pub post_id: i32,
    /// `true` when the user wrote this turn.
    pub user_chat: bool,
}

pub fn validate_chat(payload: &ChatRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("chat_id", &payload.chat_id)
        .require("room_id", &payload.room_id)
        .non_negative("post_id", payload.post_id);
    v.finish().map_err(AppError::MalformedInput)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChatMessage {
    pub chat_id: String,
    pub room_id: String,
    pub message: String,
    pub post_id: i32,
    pub user_chat: bool,
}

impl From<chat::Model> for ChatMessage {
    fn from(model: chat::Model) -> Self {
        Self {
            chat_id: model.chat_id,
            room_id: model.room_id,
            message: model.message,
            post_id: model.post_id,
            user_chat: model.user_chat,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RoomSavedResponse {
    /// ID of the room now bound to the tuple; an existing room wins over the requested id.
    pub room_id: String,
}

impl From<room::Model> for RoomSavedResponse {
    fn from(model: room::Model) -> Self {
        Self {
            room_id: model.room_id,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChatHistoryResponse {
    /// `null` when no room matches the tuple yet.
    pub room_id: Option<String>,
    pub chats: Vec<ChatMessage>,
}
