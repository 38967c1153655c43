//! Account directory: lookup/create/update/delete over user records
//!
//! The rest of the system depends only on the `AccountDirectory` trait; the
//! PostgreSQL adapter below is the production implementation.

use crate::{
    error::AppError,
    models::account::{Account, NewAccount, UpdateAccountRequest},
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Data-access contract for account records.
///
/// Not-found is an empty result, never an error; errors are reserved for
/// storage-level faults.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Combined lookup by username or email (exact match)
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn find_all(&self) -> Result<Vec<Account>, AppError>;

    async fn create(&self, fields: NewAccount) -> Result<Account, AppError>;

    /// Partial update; absent fields keep their stored values
    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateAccountRequest,
    ) -> Result<Option<Account>, AppError>;

    /// Returns true if a record was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
}

/// PostgreSQL-backed account directory
pub struct PgAccountDirectory {
    db: PgPool,
}

impl PgAccountDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM users WHERE username = $1 OR email = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(account)
    }

    async fn find_all(&self) -> Result<Vec<Account>, AppError> {
        let accounts =
            sqlx::query_as::<_, Account>("SELECT * FROM users ORDER BY created_at DESC")
                .fetch_all(&self.db)
                .await?;

        Ok(accounts)
    }

    async fn create(&self, fields: NewAccount) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&fields.username)
        .bind(&fields.email)
        .bind(&fields.password_hash)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(String::from(fields.role))
        .fetch_one(&self.db)
        .await?;

        Ok(account)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateAccountRequest,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }
}
