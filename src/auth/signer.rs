/// Access-token signing and verification.
///
/// HS256 over the claims with the configured signing key. Verification is a
/// pure function of the token and the key; it never touches the store.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::{AppError, TokenError};

/// Sign claims into a compact access token.
///
/// Deterministic for identical claims, including `iat`.
pub fn sign_access_token(claims: &Claims, settings: &AuthSettings) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(settings.signing_key.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("access token signing failed: {}", e)))
}

/// Verify an access token and return its claims.
///
/// Rejects tokens that declare any algorithm other than HS256 before
/// checking the signature, so a key confusion attack cannot downgrade
/// verification.
pub fn verify_access_token(token: &str, settings: &AuthSettings) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.signing_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::UnsupportedAlgorithm
        }
        _ => TokenError::Malformed,
    })
}
