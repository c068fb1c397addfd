/// Authentication routes: sign-up, sign-in, refresh, sign-out, and the
/// current-session endpoint.
///
/// The renewal token never appears in a response body. It travels in an
/// HTTP-only cookie scoped to the auth path, invisible to client-side
/// scripts; the access token is the only credential returned as JSON.

use actix_web::cookie::{time, Cookie};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::Claims;
use crate::configuration::AuthSettings;
use crate::error::AppError;
use crate::session::SessionManager;

const RENEWAL_COOKIE: &str = "renewal_token";
const RENEWAL_COOKIE_PATH: &str = "/auth";

const MAX_USERNAME_LENGTH: usize = 64;

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: i64,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct CurrentSessionResponse {
    pub user_id: i64,
    pub expires_at: i64,
}

fn renewal_cookie(token: String, ttl_seconds: i64) -> Cookie<'static> {
    Cookie::build(RENEWAL_COOKIE, token)
        .path(RENEWAL_COOKIE_PATH)
        .http_only(true)
        .max_age(time::Duration::seconds(ttl_seconds))
        .finish()
}

fn renewal_cookie_removal() -> Cookie<'static> {
    Cookie::build(RENEWAL_COOKIE, "")
        .path(RENEWAL_COOKIE_PATH)
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .finish()
}

fn access_token_response(access_token: String, settings: &AuthSettings) -> AccessTokenResponse {
    AccessTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: settings.access_token_ttl_seconds,
    }
}

fn validate_credentials_input(username: &str, password: &str) -> Result<(), AppError> {
    if username.trim().is_empty() {
        return Err(AppError::InvalidRequest("username is empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(AppError::InvalidRequest("username is too long".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::InvalidRequest("password is empty".to_string()));
    }
    Ok(())
}

/// POST /auth/sign-up
///
/// Create an account. 409 if the username is already taken.
pub async fn sign_up(
    form: web::Json<SignUpRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    validate_credentials_input(&form.username, &form.password)?;

    let id = sessions.create_account(&form.username, &form.password).await?;

    Ok(HttpResponse::Created().json(SignUpResponse { id }))
}

/// POST /auth/sign-in
///
/// Authenticate and issue a session. The access token is returned in the
/// body; the renewal token is set as an HTTP-only cookie. Unknown username
/// and wrong password both produce the same 401.
pub async fn sign_in(
    form: web::Json<SignInRequest>,
    sessions: web::Data<SessionManager>,
    settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    validate_credentials_input(&form.username, &form.password)?;

    let account = sessions.authenticate(&form.username, &form.password).await?;
    let tokens = sessions.issue_session(account.id).await?;

    Ok(HttpResponse::Ok()
        .cookie(renewal_cookie(
            tokens.renewal_token,
            settings.renewal_token_ttl_seconds,
        ))
        .json(access_token_response(tokens.access_token, settings.get_ref())))
}

/// POST /auth/refresh
///
/// Rotate the renewal token from the cookie into a fresh pair. A missing,
/// unknown, or expired token all produce the same 401.
pub async fn refresh(
    request: HttpRequest,
    sessions: web::Data<SessionManager>,
    settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let cookie = request.cookie(RENEWAL_COOKIE).ok_or(AppError::UnknownToken)?;

    let tokens = sessions.refresh_session(cookie.value()).await?;

    Ok(HttpResponse::Ok()
        .cookie(renewal_cookie(
            tokens.renewal_token,
            settings.renewal_token_ttl_seconds,
        ))
        .json(access_token_response(tokens.access_token, settings.get_ref())))
}

/// GET /api/me
///
/// Identity of the verified access token. Served entirely from the claims;
/// the store is never consulted.
pub async fn current_session(claims: web::ReqData<Claims>) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    Ok(HttpResponse::Ok().json(CurrentSessionResponse {
        user_id,
        expires_at: claims.exp,
    }))
}

/// POST /api/sign-out
///
/// Revoke every renewal token for the authenticated user and clear the
/// cookie. Outstanding access tokens remain valid until they expire.
pub async fn sign_out(
    claims: web::ReqData<Claims>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    sessions.revoke_all_sessions(user_id).await?;

    Ok(HttpResponse::NoContent()
        .cookie(renewal_cookie_removal())
        .finish())
}
