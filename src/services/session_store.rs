// src/services/session_store.rs
// DOCUMENTATION: In-memory session store with expiry
// PURPOSE: Map opaque session tokens to authenticated GitHub users

use crate::models::{GitHubUser, Session};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Upper bound on session lifetime (one year)
const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 3600;

/// Thread-safe session store
/// DOCUMENTATION: Sessions live in process memory; a restart signs everyone out
pub struct SessionStore {
    store: Arc<RwLock<HashMap<String, Session>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    /// Create a store whose sessions expire after `ttl_seconds`
    pub fn new(ttl_seconds: u64) -> Self {
        let ttl_seconds = ttl_seconds.min(MAX_SESSION_TTL_SECS) as i64;
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::seconds(ttl_seconds),
        }
    }

    /// Create a session for a verified GitHub user
    pub async fn create(&self, user: &GitHubUser) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            username: user.login.clone(),
            github_id: user.id,
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut store = self.store.write().await;
        store.insert(session.token.clone(), session.clone());
        log::info!("Session created for {}", session.username);

        session
    }

    /// Look up a live session
    pub async fn get(&self, token: &str) -> Option<Session> {
        let store = self.store.read().await;

        match store.get(token) {
            Some(session) if !session.is_expired() => Some(session.clone()),
            Some(session) => {
                log::debug!("Session EXPIRED for {}", session.username);
                None
            }
            None => {
                log::debug!("Session MISS");
                None
            }
        }
    }

    /// Revoke a session; returns whether one existed
    pub async fn revoke(&self, token: &str) -> bool {
        let mut store = self.store.write().await;
        match store.remove(token) {
            Some(session) => {
                log::info!("Session revoked for {}", session.username);
                true
            }
            None => false,
        }
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, session| !session.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Session cleanup: removed {} expired sessions ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get store statistics
    pub async fn stats(&self) -> SessionStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|s| s.is_expired()).count();

        SessionStats {
            total_sessions: total,
            expired_sessions: expired,
            active_sessions: total - expired,
        }
    }
}

/// Session store statistics
#[derive(Debug, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub expired_sessions: usize,
    pub active_sessions: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired sessions
pub fn start_cleanup_task(sessions: Arc<SessionStore>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            sessions.cleanup().await;
        }
    });
}
