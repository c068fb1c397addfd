/// Access-token claims (RFC 7519 subset).
///
/// Nothing server-side backs these: a structurally and cryptographically
/// valid, non-expired token is sufficient authorization on its own.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account id as a decimal string).
    pub sub: String,
    /// Issued at (Unix timestamp). Part of the claims so that two tokens
    /// minted at different instants never serialize identically.
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    /// Extract the account id from the subject claim.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::Internal("non-numeric subject in access token".to_string()))
    }

    pub fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }
}
