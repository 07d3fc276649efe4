// src/handlers/access.rs
// DOCUMENTATION: Caller identity resolution
// PURPOSE: Work out who is calling and whether they own the requested username

use crate::config::Config;
use crate::errors::GatewayError;
use crate::models::Identity;
use crate::services::SessionStore;
use actix_web::{http::header, HttpRequest};

/// Cookie holding the session token
pub const SESSION_COOKIE: &str = "showcase_session";

/// Development-only cookie naming the user to act as
pub const IMPERSONATE_COOKIE: &str = "dev_impersonate";

/// Session token from the session cookie, or an `Authorization: Bearer` header
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Key identifying the client for rate limiting
/// DOCUMENTATION: Uses `Forwarded` / `X-Forwarded-For` when present, so the
/// gateway must sit behind a proxy that overwrites those headers
pub fn client_key(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Resolve the caller of a request
/// DOCUMENTATION: impersonation cookie (development only), then the session
pub async fn resolve_identity(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionStore,
) -> Option<Identity> {
    if config.impersonation_enabled() {
        if let Some(cookie) = req.cookie(IMPERSONATE_COOKIE) {
            let username = cookie.value().trim();
            if !username.is_empty() {
                log::debug!("Impersonating {} via dev cookie", username);
                return Some(Identity {
                    username: username.to_string(),
                    impersonated: true,
                });
            }
        }
    }

    let token = session_token(req)?;
    sessions.get(&token).await.map(|session| Identity {
        username: session.username,
        impersonated: false,
    })
}

/// Require any authenticated caller
pub async fn require_identity(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionStore,
) -> Result<Identity, GatewayError> {
    resolve_identity(req, config, sessions).await.ok_or_else(|| {
        log::warn!("Unauthenticated {} {}", req.method(), req.path());
        GatewayError::Unauthorized
    })
}

/// Require the caller to be `username`
pub async fn require_owner(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionStore,
    username: &str,
) -> Result<Identity, GatewayError> {
    let identity = require_identity(req, config, sessions).await?;

    if !identity.owns(username) {
        log::warn!(
            "{} attempted {} on resources of {}",
            identity.username,
            req.method(),
            username
        );
        return Err(GatewayError::Forbidden(format!(
            "cannot act on behalf of {}",
            username
        )));
    }

    Ok(identity)
}
