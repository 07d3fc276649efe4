// src/models/session.rs
// DOCUMENTATION: Session and identity models
// PURPOSE: Authenticated caller state shared by auth and proxy handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Server-side session created after a GitHub login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Opaque token (UUID v4); never logged
    #[serde(skip_serializing)]
    pub token: String,
    pub username: String,
    pub github_id: i64,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn to_response(&self) -> SessionResponse {
        SessionResponse {
            session_token: self.token.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// The resolved caller of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    /// True when resolved from the development impersonation cookie
    pub impersonated: bool,
}

impl Identity {
    /// GitHub logins are case-insensitive
    pub fn owns(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username)
    }
}

/// Request body for POST /auth/session
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    /// GitHub OAuth access token
    #[validate(length(min = 1, max = 512))]
    pub access_token: String,
}

/// Response body for session endpoints
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_token: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Subset of GitHub's `GET /user` payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: i64,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}
