use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::shared::{Empty, Envelope, SuccessResponse};
use crate::models::user::*;
use crate::state::AppState;
use crate::store::UserStore;
use crate::store::users::NewUser;

fn new_user(payload: UserRequest) -> NewUser {
    NewUser {
        user_id: payload.user_id,
        mail_address: payload.mail_address,
        password: payload.password,
    }
}

#[utoipa::path(
    post,
    path = "/check",
    tag = "Users",
    operation_id = "checkUser",
    summary = "Probe a mail address before sign-up",
    description = "Reports `possible` when no account uses the address, `impossible` when a live account does, and `restoration` when only a deleted account does.",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Address classified", body = CheckUserResponse),
        (status = 400, description = "Missing mail_address (MalformedInput)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn check_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<CheckUserResponse>, AppError> {
    validate_mail_probe(&payload)?;

    let case = UserStore::new(&state.db)
        .probe(&payload.mail_address)
        .await?;
    Ok(Envelope::success(CheckUserResponse { case }))
}

#[utoipa::path(
    post,
    path = "/create",
    tag = "Users",
    operation_id = "createUser",
    summary = "Sign up",
    request_body = UserRequest,
    responses(
        (status = 200, description = "User created", body = SuccessResponse),
        (status = 400, description = "Invalid input (MalformedInput), address taken (DuplicateIdentity) or id taken (IntegrityViolation)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_new_user(&payload)?;

    UserStore::new(&state.db).create(new_user(payload)).await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/recreate",
    tag = "Users",
    operation_id = "recreateUser",
    summary = "Replace every account on an address with a fresh one",
    description = "Hard-deletes all rows using the mail address, then signs up again. Fails with NotFound when no row used the address.",
    request_body = UserRequest,
    responses(
        (status = 200, description = "User recreated", body = SuccessResponse),
        (status = 400, description = "Invalid input (MalformedInput)", body = ErrorBody),
        (status = 404, description = "No account used the address (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn recreate_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_new_user(&payload)?;

    UserStore::new(&state.db).recreate(new_user(payload)).await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/restore",
    tag = "Users",
    operation_id = "restoreUser",
    summary = "Restore a deleted account",
    request_body = UserRequest,
    responses(
        (status = 200, description = "User restored", body = LoginResponse),
        (status = 400, description = "Invalid input (MalformedInput), wrong password (CredentialMismatch) or a live account took the address (DuplicateIdentity)", body = ErrorBody),
        (status = 404, description = "No deleted account on the address (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn restore_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<LoginResponse>, AppError> {
    validate_credentials(&payload)?;

    let user = UserStore::new(&state.db)
        .restore(&payload.mail_address, &payload.password)
        .await?;
    Ok(Envelope::success(LoginResponse {
        user_id: user.user_id,
    }))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    operation_id = "login",
    summary = "Log in with mail address and password",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Invalid input (MalformedInput) or unknown address / wrong password (CredentialMismatch)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<LoginResponse>, AppError> {
    validate_credentials(&payload)?;

    let user = UserStore::new(&state.db)
        .authenticate(&payload.mail_address, &payload.password)
        .await?;
    Ok(Envelope::success(LoginResponse {
        user_id: user.user_id,
    }))
}

#[utoipa::path(
    post,
    path = "/delete",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Soft-delete an account",
    request_body = UserRequest,
    responses(
        (status = 200, description = "User deleted", body = SuccessResponse),
        (status = 400, description = "Missing user_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_user_id(&payload)?;

    UserStore::new(&state.db).delete(&payload.user_id).await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/password/change",
    tag = "Users",
    operation_id = "changePassword",
    summary = "Change the password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = SuccessResponse),
        (status = 400, description = "Invalid input (MalformedInput) or wrong current password (CredentialMismatch)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn change_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_change_password(&payload)?;

    UserStore::new(&state.db)
        .change_password(&payload.user_id, &payload.password, &payload.new_password)
        .await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/password/check",
    tag = "Users",
    operation_id = "checkPassword",
    summary = "Verify a user's password",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Password matches", body = SuccessResponse),
        (status = 400, description = "Invalid input (MalformedInput) or wrong password (CredentialMismatch)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn check_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_password_check(&payload)?;

    UserStore::new(&state.db)
        .check_password(&payload.user_id, &payload.password)
        .await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/password/verify",
    tag = "Users",
    operation_id = "verifyPassword",
    summary = "Report whether the user has a password set",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Presence reported", body = ExistsResponse),
        (status = 400, description = "Missing user_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn verify_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<ExistsResponse>, AppError> {
    validate_user_id(&payload)?;

    let exists = UserStore::new(&state.db)
        .has_password(&payload.user_id)
        .await?;
    Ok(Envelope::success(ExistsResponse { exists }))
}

#[utoipa::path(
    post,
    path = "/mail-address/get",
    tag = "Users",
    operation_id = "getMailAddress",
    summary = "Read the user's mail address",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Mail address", body = MailAddressResponse),
        (status = 400, description = "Missing user_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn get_mail_address(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<MailAddressResponse>, AppError> {
    validate_user_id(&payload)?;

    let mail_address = UserStore::new(&state.db)
        .mail_address(&payload.user_id)
        .await?;
    Ok(Envelope::success(MailAddressResponse { mail_address }))
}

#[utoipa::path(
    post,
    path = "/mail-address/save",
    tag = "Users",
    operation_id = "saveMailAddress",
    summary = "Change the user's mail address",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Mail address saved", body = SuccessResponse),
        (status = 400, description = "Invalid input (MalformedInput) or address held by another live user (DuplicateIdentity)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn save_mail_address(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_mail_change(&payload)?;

    UserStore::new(&state.db)
        .save_mail_address(&payload.user_id, &payload.mail_address)
        .await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/api-key/save",
    tag = "Users",
    operation_id = "saveApiKey",
    summary = "Store the user's Gemini API key",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Key saved", body = SuccessResponse),
        (status = 400, description = "Invalid input (MalformedInput)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn save_api_key(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<Empty>, AppError> {
    validate_api_key_save(&payload)?;

    UserStore::new(&state.db)
        .save_api_key(&payload.user_id, payload.gemini_api_key.trim())
        .await?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    post,
    path = "/api-key/get",
    tag = "Users",
    operation_id = "getApiKey",
    summary = "Read the user's Gemini API key",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Stored key, empty when unset", body = GeminiApiKeyResponse),
        (status = 400, description = "Missing user_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn get_api_key(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<GeminiApiKeyResponse>, AppError> {
    validate_user_id(&payload)?;

    let gemini_api_key = UserStore::new(&state.db).api_key(&payload.user_id).await?;
    Ok(Envelope::success(GeminiApiKeyResponse { gemini_api_key }))
}

#[utoipa::path(
    post,
    path = "/api-key/verify",
    tag = "Users",
    operation_id = "verifyApiKey",
    summary = "Report whether a Gemini API key is stored",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Presence reported", body = ExistsResponse),
        (status = 400, description = "Missing user_id (MalformedInput)", body = ErrorBody),
        (status = 404, description = "No live user with this id (NotFound)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn verify_api_key(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<Envelope<ExistsResponse>, AppError> {
    validate_user_id(&payload)?;

    let exists = UserStore::new(&state.db)
        .has_api_key(&payload.user_id)
        .await?;
    Ok(Envelope::success(ExistsResponse { exists }))
}
