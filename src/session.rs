/// Session manager: the orchestrator for credential issuance and rotation.
///
/// Invariant: at most one live renewal token per user. Every issuance
/// deletes the user's existing renewal tokens and inserts exactly one new
/// row, and the delete-then-insert sequence runs under a per-user lock so
/// concurrent issuances for the same user cannot interleave.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::auth::{generate_renewal_token, hash_password, sign_access_token, Claims};
use crate::configuration::AuthSettings;
use crate::error::{AppError, StoreError};
use crate::store::{Account, SessionStore};

/// An access/renewal credential pair.
///
/// The access token is stateless and unrevocable until it expires; the
/// renewal token is store-backed and revocable. The two kinds are kept
/// distinct on purpose.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub renewal_token: String,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    settings: AuthSettings,
    issuance_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, settings: AuthSettings) -> Self {
        Self {
            store,
            settings,
            issuance_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new account with a hashed password.
    pub async fn create_account(&self, username: &str, password: &str) -> Result<i64, AppError> {
        let password_hash = hash_password(password, &self.settings.password_salt);

        match self.store.create_account(username, &password_hash).await {
            Ok(id) => {
                tracing::info!(user_id = id, "account created");
                Ok(id)
            }
            Err(StoreError::DuplicateKey) => Err(AppError::DuplicateAccount),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username/password pair against the store.
    ///
    /// An unknown username and a wrong password both surface as
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let password_hash = hash_password(password, &self.settings.password_salt);

        match self.store.find_account(username, &password_hash).await {
            Ok(account) => Ok(account),
            Err(StoreError::NotFound) => Err(AppError::InvalidCredentials),
            Err(e) => Err(e.into()),
        }
    }

    /// Issue a fresh access/renewal pair for a user, superseding every
    /// renewal token they currently hold.
    ///
    /// If the insert fails after the delete the user is left with zero
    /// renewal tokens: fail-closed, no stale token remains usable.
    pub async fn issue_session(&self, user_id: i64) -> Result<SessionTokens, AppError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        self.store.delete_renewal_tokens_by_user(user_id).await?;

        let claims = Claims::new(user_id, self.settings.access_token_ttl_seconds);
        let access_token = sign_access_token(&claims, &self.settings)?;

        let renewal_token = generate_renewal_token();
        let expires_at = Utc::now() + Duration::seconds(self.settings.renewal_token_ttl_seconds);
        self.store
            .insert_renewal_token(user_id, &renewal_token, expires_at)
            .await?;

        tracing::info!(user_id, "session issued");

        Ok(SessionTokens {
            access_token,
            renewal_token,
        })
    }

    /// Rotate a renewal token into a fresh credential pair.
    ///
    /// Rotation piggybacks on issuance: the presented row is removed by the
    /// issuance delete, never as a separate consume step. An expired token
    /// is rejected here whether or not the sweeper has reclaimed it yet.
    pub async fn refresh_session(&self, renewal_token: &str) -> Result<SessionTokens, AppError> {
        let record = match self.store.find_renewal_token(renewal_token).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => return Err(AppError::UnknownToken),
            Err(e) => return Err(e.into()),
        };

        if record.expires_at < Utc::now() {
            tracing::info!(user_id = record.user_id, "expired renewal token presented");
            return Err(AppError::ExpiredToken);
        }

        self.issue_session(record.user_id).await
    }

    /// Drop every renewal token a user holds (sign-out, account-level
    /// invalidation). Outstanding access tokens stay valid until expiry.
    pub async fn revoke_all_sessions(&self, user_id: i64) -> Result<(), AppError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        self.store.delete_renewal_tokens_by_user(user_id).await?;
        tracing::info!(user_id, "all sessions revoked");

        Ok(())
    }

    async fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.issuance_locks.lock().await;
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
