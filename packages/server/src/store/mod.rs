//! Persistence for users, datasets and chats.
//!
//! Each store borrows whatever connection the caller hands it (pool or open
//! transaction); nothing here reaches for a global handle. Multi-statement
//! operations open their own transaction on that connection, which nests as
//! a savepoint when the caller is already inside one.

pub mod chats;
pub mod datasets;
pub mod users;

use common::{Lifecycle, LifecycleEvent, LifecycleFilter, Transition};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::error::AppError;

pub use chats::ChatStore;
pub use datasets::DatasetStore;
pub use users::UserStore;

/// Restrict `query` to the rows `filter` admits, using the entity's `is_delete` column.
pub(crate) fn with_lifecycle<Q, Col>(query: Q, column: Col, filter: LifecycleFilter) -> Q
where
    Q: QueryFilter,
    Col: ColumnTrait,
{
    match filter.is_delete() {
        Some(flag) => query.filter(column.eq(flag)),
        None => query,
    }
}

/// Apply a lifecycle event to the row keyed by `key`, currently in state `current`.
///
/// Flag flips are conditional on the row still being in `current`, so two
/// racing transitions cannot both win; the loser sees `NotFound`.
pub(crate) async fn apply_transition<E, C>(
    conn: &C,
    key_column: E::Column,
    flag_column: E::Column,
    key: &str,
    current: Lifecycle,
    event: LifecycleEvent,
    what: &str,
) -> Result<Transition, AppError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let transition = current.apply(event).map_err(|e| {
        tracing::debug!(key, "{}", e);
        AppError::NotFound(format!("{what} not found"))
    })?;

    let rows_affected = match transition {
        Transition::To(next) => {
            E::update_many()
                .col_expr(flag_column, Expr::value(next.is_delete()))
                .filter(key_column.eq(key))
                .filter(flag_column.eq(current.is_delete()))
                .exec(conn)
                .await?
                .rows_affected
        }
        Transition::Removed => {
            E::delete_many()
                .filter(key_column.eq(key))
                .exec(conn)
                .await?
                .rows_affected
        }
    };

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("{what} not found")));
    }

    tracing::info!(key, from = %current, ?transition, "{what} lifecycle transition");
    Ok(transition)
}
