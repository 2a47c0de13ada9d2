use chrono::Utc;
use common::{Lifecycle, LifecycleEvent, LifecycleFilter, Transition};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionSession, TransactionTrait,
};

use super::{apply_transition, with_lifecycle};
use crate::entity::{csv, user};
use crate::error::AppError;
use crate::models::dataset::{DatasetReplacement, NewDataset};

pub struct DatasetStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> DatasetStore<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Store a freshly uploaded dataset for a live user.
    pub async fn insert(&self, dataset: NewDataset) -> Result<csv::Model, AppError> {
        let owner_exists = user::Entity::find_by_id(dataset.user_id.clone())
            .filter(user::Column::IsDelete.eq(false))
            .one(self.conn)
            .await?
            .is_some();
        if !owner_exists {
            return Err(AppError::NotFound("User not found".into()));
        }

        let now = Utc::now();
        let model = csv::ActiveModel {
            csv_id: Set(dataset.csv_id),
            csv_file: Set(dataset.csv_file),
            json_file: Set(dataset.json_file),
            user_id: Set(dataset.user_id),
            file_name: Set(dataset.file_name),
            data_size: Set(dataset.shape.data_size),
            data_columns: Set(dataset.shape.data_columns),
            data_rows: Set(dataset.shape.data_rows),
            upload_date: Set(now),
            last_accessed_date: Set(now),
            is_delete: Set(false),
        }
        .insert(self.conn)
        .await?;

        tracing::info!(csv_id = %model.csv_id, user_id = %model.user_id, "Dataset uploaded");
        Ok(model)
    }

    /// Datasets of one user, most recently used first.
    pub async fn list(
        &self,
        user_id: &str,
        filter: LifecycleFilter,
    ) -> Result<Vec<csv::Model>, AppError> {
        let query = csv::Entity::find().filter(csv::Column::UserId.eq(user_id));
        Ok(with_lifecycle(query, csv::Column::IsDelete, filter)
            .order_by_desc(csv::Column::LastAccessedDate)
            .order_by_asc(csv::Column::CsvId)
            .all(self.conn)
            .await?)
    }

    pub async fn find(&self, csv_id: &str, filter: LifecycleFilter) -> Result<csv::Model, AppError> {
        let query = csv::Entity::find_by_id(csv_id.to_string());
        match with_lifecycle(query, csv::Column::IsDelete, filter)
            .one(self.conn)
            .await?
        {
            Some(model) => Ok(model),
            None => Err(self.explain_miss(csv_id, filter).await?),
        }
    }

    /// Replace the payload and counts of a live dataset.
    ///
    /// `csv_id`, `user_id`, `file_name` and `upload_date` are kept; the access
    /// time never moves backwards. The write is conditional on the row still
    /// being live, so a delete that lands after the lookup wins.
    pub async fn replace(&self, replacement: DatasetReplacement) -> Result<csv::Model, AppError> {
        let txn = self.conn.begin().await?;
        let store = DatasetStore::new(&txn);

        let current = store
            .find(&replacement.csv_id, LifecycleFilter::Live)
            .await?;
        let accessed = Utc::now().max(current.last_accessed_date);

        let rows_affected = csv::Entity::update_many()
            .col_expr(csv::Column::CsvFile, Expr::value(replacement.csv_file.clone()))
            .col_expr(csv::Column::JsonFile, Expr::value(replacement.json_file.clone()))
            .col_expr(csv::Column::DataSize, Expr::value(replacement.shape.data_size))
            .col_expr(csv::Column::DataColumns, Expr::value(replacement.shape.data_columns))
            .col_expr(csv::Column::DataRows, Expr::value(replacement.shape.data_rows))
            .col_expr(csv::Column::LastAccessedDate, Expr::value(accessed))
            .filter(csv::Column::CsvId.eq(current.csv_id.as_str()))
            .filter(csv::Column::IsDelete.eq(false))
            .exec(&txn)
            .await?
            .rows_affected;
        if rows_affected == 0 {
            return Err(store
                .explain_miss(&replacement.csv_id, LifecycleFilter::Live)
                .await?);
        }

        txn.commit().await?;

        let updated = csv::Model {
            csv_file: replacement.csv_file,
            json_file: replacement.json_file,
            data_size: replacement.shape.data_size,
            data_columns: replacement.shape.data_columns,
            data_rows: replacement.shape.data_rows,
            last_accessed_date: accessed,
            ..current
        };
        tracing::info!(csv_id = %updated.csv_id, "Dataset replaced");
        Ok(updated)
    }

    /// Move a dataset through its lifecycle. Permanent deletion leaves rooms
    /// and chats that reference the dataset in place.
    pub async fn transition(
        &self,
        csv_id: &str,
        event: LifecycleEvent,
    ) -> Result<Transition, AppError> {
        let txn = self.conn.begin().await?;

        let current = DatasetStore::new(&txn)
            .find(csv_id, LifecycleFilter::for_event(event))
            .await?;
        let transition = apply_transition::<csv::Entity, _>(
            &txn,
            csv::Column::CsvId,
            csv::Column::IsDelete,
            &current.csv_id,
            Lifecycle::from_is_delete(current.is_delete),
            event,
            "Dataset",
        )
        .await?;

        txn.commit().await?;
        Ok(transition)
    }

    /// Build the `NotFound` for a lookup that missed under `filter`, telling a
    /// dataset in the wrong state apart from one that does not exist.
    async fn explain_miss(&self, csv_id: &str, filter: LifecycleFilter) -> Result<AppError, AppError> {
        if filter == LifecycleFilter::Any {
            return Ok(AppError::NotFound("Dataset not found".into()));
        }
        let existing = csv::Entity::find_by_id(csv_id.to_string())
            .one(self.conn)
            .await?;
        let message = match existing.map(|m| Lifecycle::from_is_delete(m.is_delete)) {
            None => "Dataset not found",
            Some(Lifecycle::Deleted) => "Dataset is deleted",
            Some(Lifecycle::Active) => "Dataset is not deleted",
        };
        Ok(AppError::NotFound(message.into()))
    }
}
