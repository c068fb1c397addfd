/// Password hashing.
///
/// Deterministic salted SHA-256 digest, applied identically at sign-up and
/// sign-in so accounts can be looked up by `(username, hash)`. Verification
/// is re-hash-and-compare; plaintext is never stored.
///
/// A deployment with stricter requirements should swap the primitive for a
/// slow, per-record-salted hash (argon2, bcrypt) behind the same one-way
/// comparable contract.

use sha2::{Digest, Sha256};

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}
