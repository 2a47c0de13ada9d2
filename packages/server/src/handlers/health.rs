use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::models::health::{DatabaseStatus, HealthResponse};
use crate::models::shared::{Envelope, StatusMessage};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    operation_id = "health",
    summary = "Liveness and database reachability",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Envelope::success(HealthResponse {
                database: DatabaseStatus::Up,
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check: database ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Envelope {
                    status_message: StatusMessage::Failed,
                    payload: HealthResponse {
                        database: DatabaseStatus::Down,
                    },
                },
            )
        }
    }
}
