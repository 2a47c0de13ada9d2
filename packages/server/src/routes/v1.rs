use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{chats, datasets, users};
use crate::state::AppState;

pub fn routes(max_upload_bytes: usize) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/users", user_routes())
        .nest("/csvs", dataset_routes(max_upload_bytes))
        .nest("/chats", chat_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(users::check_user))
        .routes(routes!(users::create_user))
        .routes(routes!(users::recreate_user))
        .routes(routes!(users::restore_user))
        .routes(routes!(users::login))
        .routes(routes!(users::delete_user))
        .routes(routes!(users::change_password))
        .routes(routes!(users::check_password))
        .routes(routes!(users::verify_password))
        .routes(routes!(users::get_mail_address))
        .routes(routes!(users::save_mail_address))
        .routes(routes!(users::save_api_key))
        .routes(routes!(users::get_api_key))
        .routes(routes!(users::verify_api_key))
}

fn dataset_routes(max_upload_bytes: usize) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(datasets::upload_csv))
        .routes(routes!(datasets::update_csv))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    OpenApiRouter::new()
        .routes(routes!(datasets::list_csvs))
        .routes(routes!(datasets::list_deleted_csvs))
        .routes(routes!(datasets::delete_csv))
        .routes(routes!(datasets::restore_csv))
        .routes(routes!(datasets::purge_csv))
        .routes(routes!(datasets::get_csv))
        .routes(routes!(datasets::download_csv))
        .merge(upload)
}

fn chat_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(chats::save_room))
        .routes(routes!(chats::save_chat))
        .routes(routes!(chats::get_chats))
        .routes(routes!(chats::reset_chat))
}
