use common::validation::Violations;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound on password length, in bytes.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Request body shared by the user endpoints.
///
/// Every field is optional on the wire and defaults to empty; each endpoint
/// checks the subset it needs.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct UserRequest {
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    #[schema(example = "3f0e6a52-8c1d-4b7e-9a43-0d7f2c1e5b90")]
    pub user_id: String,
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    #[schema(example = "alice@example.com")]
    pub mail_address: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    #[schema(example = "AIza...")]
    pub gemini_api_key: String,
}

/// Request body for changing a password.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ChangePasswordRequest {
    #[serde(deserialize_with = "crate::models::shared::trimmed")]
    pub user_id: String,
    /// Current password.
    pub password: String,
    pub new_password: String,
}

/// Sign-up: needs a fresh id, a well-formed address and a password.
pub fn validate_new_user(payload: &UserRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("user_id", &payload.user_id)
        .require("mail_address", &payload.mail_address)
        .mail_address("mail_address", &payload.mail_address)
        .require("password", &payload.password)
        .max_len("password", &payload.password, MAX_PASSWORD_LEN);
    v.finish().map_err(AppError::MalformedInput)
}

/// Login and restore: look up by address, then verify the password.
pub fn validate_credentials(payload: &UserRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("mail_address", &payload.mail_address)
        .require("password", &payload.password);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_mail_probe(payload: &UserRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("mail_address", &payload.mail_address);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_user_id(payload: &UserRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("user_id", &payload.user_id);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_password_check(payload: &UserRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("user_id", &payload.user_id)
        .require("password", &payload.password);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_mail_change(payload: &UserRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("user_id", &payload.user_id)
        .require("mail_address", &payload.mail_address)
        .mail_address("mail_address", &payload.mail_address);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_api_key_save(payload: &UserRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("user_id", &payload.user_id)
        .require("gemini_api_key", &payload.gemini_api_key);
    v.finish().map_err(AppError::MalformedInput)
}

pub fn validate_change_password(payload: &ChangePasswordRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.require("user_id", &payload.user_id)
        .require("password", &payload.password)
        .require("new_password", &payload.new_password)
        .max_len("new_password", &payload.new_password, MAX_PASSWORD_LEN);
    v.finish().map_err(AppError::MalformedInput)
}

/// Result of probing a mail address before sign-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SignupCase {
    /// No row uses the address.
    Possible,
    /// A live user owns the address.
    Impossible,
    /// Only a soft-deleted user owns the address; it can be restored or recreated.
    Restoration,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckUserResponse {
    pub case: SignupCase,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    #[serde(rename = "UserId")]
    pub user_id: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MailAddressResponse {
    #[serde(rename = "MailAddress")]
    pub mail_address: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GeminiApiKeyResponse {
    #[serde(rename = "GeminiApiKey")]
    pub gemini_api_key: String,
}

/// Answer to "is this credential set?".
#[derive(Serialize, utoipa::ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}
