use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{chat, csv, room};

/// Partial unique index that keeps at most one live user per mail address.
pub const LIVE_MAIL_INDEX: &str = "idx_user_live_mail_address";

/// Ensure the indexes schema-sync cannot express exist.
///
/// Failures are logged and skipped; the transactional checks in the stores
/// still hold without them.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Postgres-only: sea-query has no builder for partial indexes.
    let live_mail = format!(
        r#"CREATE UNIQUE INDEX IF NOT EXISTS "{LIVE_MAIL_INDEX}" ON "user" ("mail_address") WHERE "is_delete" = false"#
    );
    create_index(db, LIVE_MAIL_INDEX, &live_mail).await;

    let room_tuple = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_room_tuple")
        .table(room::Entity)
        .col(room::Column::CsvId)
        .col(room::Column::VisualizationType)
        .col(room::Column::Vertical)
        .col(room::Column::Horizontal)
        .col(room::Column::Target)
        .col(room::Column::Regression)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_room_tuple", &room_tuple).await;

    // History: SELECT ... FROM chat WHERE room_id = ? ORDER BY post_id
    let chat_order = Index::create()
        .if_not_exists()
        .name("idx_chat_room_post")
        .table(chat::Entity)
        .col(chat::Column::RoomId)
        .col(chat::Column::PostId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_chat_room_post", &chat_order).await;

    // Listing: SELECT ... FROM csv WHERE user_id = ? AND is_delete = ?
    let csv_owner = Index::create()
        .if_not_exists()
        .name("idx_csv_user_deleted")
        .table(csv::Entity)
        .col(csv::Column::UserId)
        .col(csv::Column::IsDelete)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_csv_user_deleted", &csv_owner).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &str) {
    match db.execute_unprepared(stmt).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}
