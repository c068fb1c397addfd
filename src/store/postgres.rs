/// Postgres adapter for the credential store.
///
/// Schema lives in `migrations/`. Uniqueness of `accounts.username` and
/// `renewal_tokens.token` is enforced by the database and surfaces as
/// `StoreError::DuplicateKey`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::store::{Account, RenewalToken, SessionStore};

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO accounts (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_account(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, password_hash FROM accounts \
             WHERE username = $1 AND password_hash = $2",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(Account {
            id: row.0,
            username: row.1,
            password_hash: row.2,
        })
    }

    async fn insert_renewal_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO renewal_tokens (user_id, token, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_renewal_token(&self, token: &str) -> Result<RenewalToken, StoreError> {
        let row = sqlx::query_as::<_, (i64, i64, String, DateTime<Utc>)>(
            "SELECT id, user_id, token, expires_at FROM renewal_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(RenewalToken {
            id: row.0,
            user_id: row.1,
            token: row.2,
            expires_at: row.3,
        })
    }

    async fn delete_renewal_tokens_by_user(&self, user_id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM renewal_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired_renewal_tokens(
        &self,
        before: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM renewal_tokens WHERE expires_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
