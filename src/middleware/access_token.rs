/// Access-token guard.
///
/// Verifies the Bearer token from the Authorization header and injects the
/// claims into request extensions for downstream handlers. Verification is
/// pure computation against the signing key; no store lookup happens here.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::verify_access_token;
use crate::configuration::AuthSettings;

pub struct RequireAccessToken {
    settings: AuthSettings,
}

impl RequireAccessToken {
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAccessToken
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAccessTokenService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireAccessTokenService {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

pub struct RequireAccessTokenService<S> {
    service: Rc<S>,
    settings: AuthSettings,
}

impl<S, B> Service<ServiceRequest> for RequireAccessTokenService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_owned);

        let token = match bearer {
            Some(token) => token,
            None => {
                tracing::warn!("missing or non-Bearer Authorization header");
                let response = HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "missing access token",
                    "code": "UNAUTHORIZED"
                }));
                return Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response(
                        "missing access token",
                        response,
                    )
                    .into())
                });
            }
        };

        match verify_access_token(&token, &self.settings) {
            Ok(claims) => {
                tracing::debug!(user_id = %claims.sub, "access token verified");
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(error = %e, "access token rejected");
                let response = HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "invalid or expired access token",
                    "code": "UNAUTHORIZED"
                }));
                Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response(
                        "invalid access token",
                        response,
                    )
                    .into())
                })
            }
        }
    }
}
