use std::time::Duration;

use common::retry::{RetryPolicy, retry_async};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

/// Connect (retrying per `config`) and bring the schema in line with the entities.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let policy = RetryPolicy::new(
        config.connect_retries,
        Duration::from_secs(config.retry_interval_secs),
    );
    let db = retry_async(policy, "Database connection", || Database::connect(opt.clone())).await?;

    db.get_schema_registry("csvlab_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
