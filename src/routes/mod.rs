mod auth;
mod health_check;

pub use auth::{current_session, refresh, sign_in, sign_out, sign_up};
pub use health_check::health_check;
