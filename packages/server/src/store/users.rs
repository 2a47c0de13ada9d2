use common::credential;
use common::{Lifecycle, LifecycleEvent, LifecycleFilter};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionSession, TransactionTrait,
};

use super::{apply_transition, with_lifecycle};
use crate::entity::user;
use crate::error::AppError;
use crate::models::user::SignupCase;
use crate::seed::LIVE_MAIL_INDEX;

/// A sign-up whose password has not been hashed yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub mail_address: String,
    pub password: String,
}

pub struct UserStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> UserStore<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Classify a mail address for the sign-up screen.
    pub async fn probe(&self, mail_address: &str) -> Result<SignupCase, AppError> {
        // Live rows sort first (false < true).
        let found = user::Entity::find()
            .filter(user::Column::MailAddress.eq(mail_address))
            .order_by_asc(user::Column::IsDelete)
            .one(self.conn)
            .await?;

        Ok(match found.map(|u| Lifecycle::from_is_delete(u.is_delete)) {
            None => SignupCase::Possible,
            Some(Lifecycle::Active) => SignupCase::Impossible,
            Some(Lifecycle::Deleted) => SignupCase::Restoration,
        })
    }

    pub async fn find_by_id(
        &self,
        user_id: &str,
        filter: LifecycleFilter,
    ) -> Result<user::Model, AppError> {
        let query = user::Entity::find().filter(user::Column::UserId.eq(user_id));
        with_lifecycle(query, user::Column::IsDelete, filter)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn find_live_by_mail(&self, mail_address: &str) -> Result<user::Model, AppError> {
        user::Entity::find()
            .filter(user::Column::MailAddress.eq(mail_address))
            .filter(user::Column::IsDelete.eq(false))
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Insert a new live user unless the address is already taken by a live one.
    pub async fn create(&self, new_user: NewUser) -> Result<user::Model, AppError> {
        let digest = credential::hash_password_blocking(new_user.password).await?;

        let txn = self.conn.begin().await?;

        let taken = user::Entity::find()
            .filter(user::Column::MailAddress.eq(new_user.mail_address.as_str()))
            .filter(user::Column::IsDelete.eq(false))
            .one(&txn)
            .await?
            .is_some();
        if taken {
            return Err(AppError::DuplicateIdentity);
        }

        let model = insert_user(&txn, new_user.user_id, new_user.mail_address, digest).await?;
        txn.commit().await?;

        tracing::info!(user_id = %model.user_id, "User created");
        Ok(model)
    }

    /// Drop every row holding the address and insert a fresh user in its place.
    pub async fn recreate(&self, new_user: NewUser) -> Result<user::Model, AppError> {
        let digest = credential::hash_password_blocking(new_user.password).await?;

        let txn = self.conn.begin().await?;

        let removed = user::Entity::delete_many()
            .filter(user::Column::MailAddress.eq(new_user.mail_address.as_str()))
            .exec(&txn)
            .await?
            .rows_affected;
        if removed == 0 {
            return Err(AppError::NotFound(
                "No user is registered with this mail address".into(),
            ));
        }

        let model = insert_user(&txn, new_user.user_id, new_user.mail_address, digest).await?;
        txn.commit().await?;

        tracing::info!(user_id = %model.user_id, removed, "User recreated");
        Ok(model)
    }

    /// Look up a live user by address and check the password.
    ///
    /// An unknown address is reported exactly like a wrong password.
    pub async fn authenticate(
        &self,
        mail_address: &str,
        password: &str,
    ) -> Result<user::Model, AppError> {
        let user = match self.find_live_by_mail(mail_address).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::CredentialMismatch),
            Err(e) => return Err(e),
        };
        credential::verify_password_blocking(user.password.clone(), password.to_string())
            .await?;
        Ok(user)
    }

    /// Soft-delete a live user.
    pub async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        let user = self
            .find_by_id(user_id, LifecycleFilter::for_event(LifecycleEvent::Delete))
            .await?;
        apply_transition::<user::Entity, _>(
            self.conn,
            user::Column::UserId,
            user::Column::IsDelete,
            &user.user_id,
            Lifecycle::from_is_delete(user.is_delete),
            LifecycleEvent::Delete,
            "User",
        )
        .await?;
        Ok(())
    }

    /// Bring back a soft-deleted user whose password matches.
    ///
    /// Several deleted rows may share an address; the first one whose digest
    /// verifies is restored. The digest itself is left untouched.
    pub async fn restore(
        &self,
        mail_address: &str,
        password: &str,
    ) -> Result<user::Model, AppError> {
        let candidates = user::Entity::find()
            .filter(user::Column::MailAddress.eq(mail_address))
            .filter(user::Column::IsDelete.eq(true))
            .order_by_asc(user::Column::UserId)
            .all(self.conn)
            .await?;
        if candidates.is_empty() {
            return Err(AppError::NotFound(
                "No deleted user is registered with this mail address".into(),
            ));
        }

        let mut matched = None;
        for candidate in candidates {
            let verified = credential::verify_password_blocking(
                candidate.password.clone(),
                password.to_string(),
            )
            .await;
            if verified.is_ok() {
                matched = Some(candidate);
                break;
            }
        }
        let user = matched.ok_or(AppError::CredentialMismatch)?;

        apply_transition::<user::Entity, _>(
            self.conn,
            user::Column::UserId,
            user::Column::IsDelete,
            &user.user_id,
            Lifecycle::Deleted,
            LifecycleEvent::Restore,
            "User",
        )
        .await
        .map_err(map_live_mail_conflict)?;

        tracing::info!(user_id = %user.user_id, "User restored");
        Ok(user::Model {
            is_delete: false,
            ..user
        })
    }

    /// Verify a live user's password by id.
    pub async fn check_password(&self, user_id: &str, password: &str) -> Result<(), AppError> {
        let user = self.find_by_id(user_id, LifecycleFilter::Live).await?;
        credential::verify_password_blocking(user.password, password.to_string()).await?;
        Ok(())
    }

    pub async fn has_password(&self, user_id: &str) -> Result<bool, AppError> {
        let user = self.find_by_id(user_id, LifecycleFilter::Live).await?;
        Ok(!user.password.is_empty())
    }

    /// Verify the current password, then store a digest of the new one.
    pub async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self.find_by_id(user_id, LifecycleFilter::Live).await?;
        credential::verify_password_blocking(user.password.clone(), current.to_string()).await?;
        let digest = credential::hash_password_blocking(new_password.to_string()).await?;

        self.update_live_column(user_id, user::Column::Password, digest)
            .await?;
        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    pub async fn mail_address(&self, user_id: &str) -> Result<String, AppError> {
        Ok(self
            .find_by_id(user_id, LifecycleFilter::Live)
            .await?
            .mail_address)
    }

    /// Move a live user to a new address, unless another live user holds it.
    pub async fn save_mail_address(
        &self,
        user_id: &str,
        mail_address: &str,
    ) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;

        let user = UserStore::new(&txn)
            .find_by_id(user_id, LifecycleFilter::Live)
            .await?;
        let taken = user::Entity::find()
            .filter(user::Column::MailAddress.eq(mail_address))
            .filter(user::Column::IsDelete.eq(false))
            .filter(user::Column::UserId.ne(user.user_id.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if taken {
            return Err(AppError::DuplicateIdentity);
        }

        UserStore::new(&txn)
            .update_live_column(user_id, user::Column::MailAddress, mail_address.to_string())
            .await
            .map_err(map_live_mail_conflict)?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn save_api_key(&self, user_id: &str, api_key: &str) -> Result<(), AppError> {
        self.update_live_column(user_id, user::Column::GeminiApiKey, api_key.to_string())
            .await
    }

    pub async fn api_key(&self, user_id: &str) -> Result<String, AppError> {
        Ok(self
            .find_by_id(user_id, LifecycleFilter::Live)
            .await?
            .gemini_api_key)
    }

    pub async fn has_api_key(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(!self.api_key(user_id).await?.trim().is_empty())
    }

    async fn update_live_column(
        &self,
        user_id: &str,
        column: user::Column,
        value: String,
    ) -> Result<(), AppError> {
        let result = user::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .filter(user::Column::UserId.eq(user_id))
            .filter(user::Column::IsDelete.eq(false))
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}

async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    user_id: String,
    mail_address: String,
    digest: String,
) -> Result<user::Model, AppError> {
    let model = user::ActiveModel {
        user_id: Set(user_id),
        mail_address: Set(mail_address),
        password: Set(digest),
        gemini_api_key: Set(String::new()),
        is_delete: Set(false),
    };
    model.insert(conn).await.map_err(map_insert_error)
}

/// A racing sign-up that slipped past the pre-check trips the partial index.
fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains(LIVE_MAIL_INDEX) => {
            tracing::debug!("Sign-up race: live mail index caught the duplicate");
            AppError::DuplicateIdentity
        }
        _ => AppError::from(err),
    }
}

fn map_live_mail_conflict(err: AppError) -> AppError {
    match err {
        AppError::IntegrityViolation(detail) if detail.contains(LIVE_MAIL_INDEX) => {
            AppError::DuplicateIdentity
        }
        other => other,
    }
}
