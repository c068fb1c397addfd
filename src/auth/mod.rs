/// Credential primitives: access-token claims and signing, password
/// hashing, and renewal-token generation.

mod claims;
mod password;
mod renewal;
mod signer;

pub use claims::Claims;
pub use password::hash_password;
pub use renewal::generate_renewal_token;
pub use signer::sign_access_token;
pub use signer::verify_access_token;
