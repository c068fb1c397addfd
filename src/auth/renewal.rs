/// Renewal-token generation.
///
/// Opaque, fixed-length, unpredictable strings drawn from the OS-seeded
/// CSPRNG behind `thread_rng`. Collision with a stored token is
/// astronomically unlikely; the store's uniqueness constraint is the
/// backstop.

use rand::RngCore;

const RENEWAL_TOKEN_BYTES: usize = 32;

/// Generate a 64-character hex renewal token (32 random bytes).
pub fn generate_renewal_token() -> String {
    let mut bytes = [0u8; RENEWAL_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let mut token = String::with_capacity(RENEWAL_TOKEN_BYTES * 2);
    for byte in bytes {
        token.push_str(&format!("{:02x}", byte));
    }
    token
}
