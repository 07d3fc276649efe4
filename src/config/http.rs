// src/config/http.rs
// DOCUMENTATION: Shared HTTP client initialization
// PURPOSE: Build the pooled reqwest client used for backend and GitHub calls

use crate::config::Config;
use reqwest::Client;
use std::time::Duration;

/// Initialize the outbound HTTP client
/// DOCUMENTATION: Called once during application startup in main.rs
/// The returned client is cloned into every service (clones share one pool)
pub fn init_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    log::info!(
        "Initializing HTTP client (timeout: {}s)",
        config.backend_timeout_secs
    );

    Client::builder()
        // Whole-request timeout, including body read
        .timeout(Duration::from_secs(config.backend_timeout_secs))
        .connect_timeout(Duration::from_secs(config.backend_timeout_secs.min(5)))
        // Idle pooled connections are dropped after 90 seconds
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!("showcase-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
}
