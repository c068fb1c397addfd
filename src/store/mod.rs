/// Credential store contract.
///
/// The store is a dumb durable mapping: point lookups and deletes, no
/// business logic. The session manager owns all sequencing on top of it.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgSessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct RenewalToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new account; `DuplicateKey` if the username exists.
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError>;

    /// Look up an account by username and password digest; `NotFound` if no
    /// row matches both.
    async fn find_account(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError>;

    async fn insert_renewal_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Look up a renewal token by its opaque value; `NotFound` if absent.
    async fn find_renewal_token(&self, token: &str) -> Result<RenewalToken, StoreError>;

    async fn delete_renewal_tokens_by_user(&self, user_id: i64) -> Result<(), StoreError>;

    /// Delete every renewal token with `expires_at` strictly before the
    /// cutoff; returns the number of rows removed.
    async fn delete_expired_renewal_tokens(
        &self,
        before: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
