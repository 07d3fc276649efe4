// src/handlers/auth.rs
// DOCUMENTATION: Session handlers
// PURPOSE: Exchange a GitHub access token for a gateway session

use super::access::{self, SESSION_COOKIE};
use crate::config::Config;
use crate::errors::GatewayError;
use crate::models::CreateSessionRequest;
use crate::services::{GitHubClient, LoginLimiter, SessionStore};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, HttpRequest, HttpResponse, Responder,
};
use std::sync::Arc;
use validator::Validate;

/// POST /auth/session
/// Create a session from a GitHub OAuth access token
///
/// DOCUMENTATION: Verifies the token against GitHub `/user`, stores a session
/// and sets the session cookie. Rate-limited per client address.
pub async fn create_session(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<Arc<SessionStore>>,
    github: web::Data<GitHubClient>,
    limiter: web::Data<LoginLimiter>,
    body: web::Json<CreateSessionRequest>,
) -> Result<impl Responder, GatewayError> {
    limiter.check(&access::client_key(&req))?;

    body.validate()?;

    let user = github.current_user(&body.access_token).await?;
    let session = sessions.create(&user).await;

    let cookie = Cookie::build(SESSION_COOKIE, session.token.clone())
        .path("/")
        .http_only(true)
        .secure(!config.is_development())
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(config.session_ttl_secs as i64))
        .finish();

    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(session.to_response()))
}

/// GET /auth/session
/// Return the resolved caller
pub async fn current_session(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<Arc<SessionStore>>,
) -> Result<impl Responder, GatewayError> {
    let identity = access::require_identity(&req, &config, sessions.get_ref()).await?;
    Ok(HttpResponse::Ok().json(identity))
}

/// DELETE /auth/session
/// Revoke the current session and clear the cookie
pub async fn delete_session(
    req: HttpRequest,
    sessions: web::Data<Arc<SessionStore>>,
) -> impl Responder {
    if let Some(token) = access::session_token(&req) {
        sessions.revoke(&token).await;
    }

    let removal = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish();

    HttpResponse::NoContent().cookie(removal).finish()
}

/// Configuration for auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/auth/session")
            .route(web::post().to(create_session))
            .route(web::get().to(current_session))
            .route(web::delete().to(delete_session)),
    );
}
