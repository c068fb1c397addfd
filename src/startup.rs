use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::AuthSettings;
use crate::middleware::RequireAccessToken;
use crate::routes::{current_session, health_check, refresh, sign_in, sign_out, sign_up};
use crate::session::SessionManager;
use crate::store::SessionStore;

/// Build the HTTP server on an already-bound listener.
///
/// Takes the store as a trait object so tests can run the full stack
/// against the in-memory implementation.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn SessionStore>,
    auth_settings: AuthSettings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionManager::new(store, auth_settings.clone()));
    let settings = web::Data::new(auth_settings.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(sessions.clone())
            .app_data(settings.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/sign-up", web::post().to(sign_up))
            .route("/auth/sign-in", web::post().to(sign_in))
            .route("/auth/refresh", web::post().to(refresh))
            // Routes guarded by a verified access token
            .service(
                web::scope("/api")
                    .wrap(RequireAccessToken::new(auth_settings.clone()))
                    .route("/me", web::get().to(current_session))
                    .route("/sign-out", web::post().to(sign_out)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
