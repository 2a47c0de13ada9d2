mod v1;

use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes(max_upload_bytes: usize) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes(max_upload_bytes))
}

pub fn system_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::health::health))
}
