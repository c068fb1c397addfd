/// Error handling for the credential issuance service.
///
/// Domain-specific error enums feed a unified `AppError` that maps onto
/// HTTP responses with structured context. Credential and token failures
/// are deliberately collapsed into one external "unauthorized" outcome so
/// callers cannot tell which check failed; the precise variant is only
/// visible in the logs.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Access-token verification errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token structure could not be parsed.
    Malformed,
    /// The token declares a signing algorithm other than the one in use.
    UnsupportedAlgorithm,
    /// The signature does not match the claims.
    InvalidSignature,
    /// The token's expiry has passed.
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::UnsupportedAlgorithm => write!(f, "unsupported signing algorithm"),
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Expired => write!(f, "token has expired"),
        }
    }
}

impl StdError for TokenError {}

/// Credential-store errors, the failure surface of the `SessionStore` contract.
#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate username or token).
    DuplicateKey,
    /// No row matched the lookup.
    NotFound,
    /// The store could not be reached.
    Unavailable(String),
    /// Any other store failure.
    Unexpected(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey => write!(f, "duplicate key"),
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::Unexpected(msg) => write!(f, "store error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            // 23505 = unique_violation
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::DuplicateKey
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Unexpected(err.to_string()),
        }
    }
}

/// Central application error type.
#[derive(Debug)]
pub enum AppError {
    /// Sign-up with a username that already exists.
    DuplicateAccount,
    /// Unknown username or wrong password; never distinguished.
    InvalidCredentials,
    /// A renewal token that is not present in the store.
    UnknownToken,
    /// A renewal token past its expiry, whether swept yet or not.
    ExpiredToken,
    /// Malformed or incomplete request input.
    InvalidRequest(String),
    Token(TokenError),
    Store(StoreError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DuplicateAccount => write!(f, "username is already taken"),
            AppError::InvalidCredentials => write!(f, "invalid username or password"),
            AppError::UnknownToken => write!(f, "unknown renewal token"),
            AppError::ExpiredToken => write!(f, "renewal token has expired"),
            AppError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            AppError::Token(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Token(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

/// Error response body returned to HTTP clients.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Correlation id for matching the response against server logs.
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// External (status, code, message) for this error. Unauthorized-class
    /// variants share one body so the failing check is not leaked.
    fn http_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::DuplicateAccount => (
                StatusCode::CONFLICT,
                "DUPLICATE_ACCOUNT",
                self.to_string(),
            ),
            AppError::InvalidCredentials
            | AppError::UnknownToken
            | AppError::ExpiredToken
            | AppError::Token(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "invalid credentials or session".to_string(),
            ),
            AppError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                self.to_string(),
            ),
            AppError::Store(StoreError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "storage temporarily unavailable".to_string(),
            ),
            AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "storage error occurred".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".to_string(),
            ),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::DuplicateAccount => {
                tracing::warn!(error_id, error = %self, "duplicate account attempt");
            }
            AppError::InvalidCredentials => {
                tracing::warn!(error_id, error = %self, "invalid credentials attempt");
            }
            AppError::UnknownToken | AppError::ExpiredToken | AppError::Token(_) => {
                tracing::warn!(error_id, error = %self, "session rejected");
            }
            AppError::InvalidRequest(_) => {
                tracing::warn!(error_id, error = %self, "invalid request");
            }
            AppError::Store(e) => {
                tracing::error!(error_id, error = %e, "store error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id, error = %msg, "internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, code, message) = self.http_parts();
        let body = ErrorResponse::new(error_id, message, code.to_string(), status.as_u16());

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.http_parts().0
    }
}
