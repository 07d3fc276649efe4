// src/services/login_limiter.rs
// DOCUMENTATION: Per-client rate limiting for session creation
// PURPOSE: Bound how often one client can hit GitHub through POST /auth/session

use crate::errors::GatewayError;
use governor::{
    clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Keyed GCRA limiter, one bucket per client address
pub struct LoginLimiter {
    limiter: KeyedLimiter,
}

impl LoginLimiter {
    /// Allow `per_minute` attempts per client (a zero value is treated as one)
    pub fn new(per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }

    /// Consume one attempt for `client`
    pub fn check(&self, client: &str) -> Result<(), GatewayError> {
        self.limiter.check_key(&client.to_string()).map_err(|_| {
            log::warn!("Login rate limit exceeded for {}", client);
            GatewayError::RateLimitExceeded
        })
    }

    /// Drop buckets that have fully refilled
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
    }
}

/// Start background sweep of idle limiter buckets
pub fn start_sweeper_task(limiter: Arc<LoginLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });
}
