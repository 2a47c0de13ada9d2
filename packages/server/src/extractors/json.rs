use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body for the csvlab endpoints.
///
/// Any rejection (wrong content type, unparseable body, mistyped field) is
/// reported as `MalformedInput` inside the `{"StatusMessage": "Failed", ...}`
/// envelope rather than axum's plain-text rejection.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                tracing::debug!(
                    status = %rejection.status(),
                    "Rejected JSON body: {}",
                    rejection.body_text()
                );
                Err(AppError::MalformedInput(rejection.body_text()))
            }
        }
    }
}
