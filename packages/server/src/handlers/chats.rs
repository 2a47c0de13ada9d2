use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::chat::*;
use crate::models::shared::{Empty, Envelope, SuccessResponse};
use crate::state::AppState;
use crate::store::ChatStore;

#[utoipa::path(
    post,
    path = "/room/save",
    tag = "Chats",
    operation_id = "saveRoom",
    summary = "Bind a room to a visualization",
    description = "If a room already exists for the tuple `(csv_id, visualization_type, vertical, horizontal, target, regression)` it is returned unchanged and the requested `room_id` is ignored.",
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room bound to the tuple", body = RoomSavedResponse),
        (status = 400, description = "Invalid input (MalformedInput) or room_id taken (IntegrityViolation)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(room_id = %payload.room_id, csv_id = %payload.csv_id))]
pub async fn save_room(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoomRequest>,
) -> Result<Envelope<RoomSavedResponse>, AppError> {
    validate_room_save(&payload)?;

    let room_id = payload.room_id.clone();
    let room = ChatStore::new(&state.db)
        .save_room(room_id, RoomKey::from(payload))
        .await?;
    Ok(Envelope::success(RoomSavedResponse::from(room)))
}

#[utoipa::path(
    post,
    path = "/message/save",
    tag = "Chats",
    operation_id = "saveChat",
    summary = "Append a message to a room",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Message stored", body = SuccessResponse),
        (status = 400, description = "Invalid input (MalformedInput) or chat_id taken (IntegrityViolation)", body = ErrorBody),
        (status = 404, description = "Room not found (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(room_id = %payload.room_id, post_id = payload.post_id))]
pub async fn save_chat(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChatRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_chat(&payload)?;

    ChatStore::new(&state.db).save_message(payload).await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/history",
    tag = "Chats",
    operation_id = "getChats",
    summary = "Fetch the conversation of a visualization",
    description = "Resolves the room from the tuple and returns its messages in `post_id` order. A tuple with no room yields an empty list and a null `room_id`.",
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room history", body = ChatHistoryResponse),
        (status = 400, description = "Invalid input (MalformedInput)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(csv_id = %payload.csv_id))]
pub async fn get_chats(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoomRequest>,
) -> Result<Envelope<ChatHistoryResponse>, AppError> {
    validate_room_lookup(&payload)?;

    let store = ChatStore::new(&state.db);
    let Some(room) = store.find_room(&RoomKey::from(payload)).await? else {
        return Ok(Envelope::success(ChatHistoryResponse {
            room_id: None,
            chats: Vec::new(),
        }));
    };

    let chats = store.history(&room.room_id).await?;
    Ok(Envelope::success(ChatHistoryResponse {
        room_id: Some(room.room_id),
        chats: chats.into_iter().map(ChatMessage::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/reset",
    tag = "Chats",
    operation_id = "resetChat",
    summary = "Delete a room and all of its messages",
    request_body = RoomIdRequest,
    responses(
        (status = 200, description = "Room removed", body = SuccessResponse),
        (status = 400, description = "Missing room_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "Room not found (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(room_id = %payload.room_id))]
pub async fn reset_chat(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoomIdRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_room_id(&payload)?;

    ChatStore::new(&state.db).reset(&payload.room_id).await?;
    Ok(Envelope::ok())
}
