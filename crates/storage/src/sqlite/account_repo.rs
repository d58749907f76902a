use async_trait::async_trait;
use course_core::model::UserId;

use super::SqliteRepository;
use super::mapping::{conn, map_account_row};
use crate::repository::{AccountRecord, AccountRepository, StorageError};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl AccountRepository for SqliteRepository {
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO accounts (id, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(account.id.to_string())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StorageError::Conflict
            } else {
                conn(err)
            }
        })?;
        Ok(())
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_account_row).transpose()
    }

    async fn get_account(&self, id: UserId) -> Result<Option<AccountRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM accounts WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_account_row).transpose()
    }
}
