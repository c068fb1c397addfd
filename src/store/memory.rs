/// In-memory credential store.
///
/// Backs the test suites so they run without a live database. One mutex
/// guards all state, so each contract operation is atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{Account, RenewalToken, SessionStore};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    tokens: Vec<RenewalToken>,
    next_account_id: i64,
    next_token_id: i64,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All renewal tokens currently held for a user. Test inspection helper.
    pub async fn renewal_tokens_for(&self, user_id: i64) -> Vec<RenewalToken> {
        let inner = self.inner.lock().await;
        inner
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.accounts.iter().any(|a| a.username == username) {
            return Err(StoreError::DuplicateKey);
        }

        inner.next_account_id += 1;
        let id = inner.next_account_id;
        inner.accounts.push(Account {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        });

        Ok(id)
    }

    async fn find_account(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .accounts
            .iter()
            .find(|a| a.username == username && a.password_hash == password_hash)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_renewal_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.tokens.iter().any(|t| t.token == token) {
            return Err(StoreError::DuplicateKey);
        }

        inner.next_token_id += 1;
        let id = inner.next_token_id;
        inner.tokens.push(RenewalToken {
            id,
            user_id,
            token: token.to_string(),
            expires_at,
        });

        Ok(())
    }

    async fn find_renewal_token(&self, token: &str) -> Result<RenewalToken, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .tokens
            .iter()
            .find(|t| t.token == token)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_renewal_tokens_by_user(&self, user_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.tokens.retain(|t| t.user_id != user_id);
        Ok(())
    }

    async fn delete_expired_renewal_tokens(
        &self,
        before: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before_len = inner.tokens.len();
        inner.tokens.retain(|t| t.expires_at >= before);
        Ok((before_len - inner.tokens.len()) as u64)
    }
}
