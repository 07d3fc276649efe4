// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, shared clients and sessions, then start the HTTP server

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use config::Config;
use dotenv::dotenv;
use errors::{json_error_handler, query_error_handler};
use services::{
    start_cleanup_task, start_sweeper_task, BackendClient, GitHubClient, LoginLimiter,
    SessionStore,
};
use std::sync::Arc;

/// Interval between expired-session sweeps
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 300;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        anyhow::bail!("invalid configuration: {}", e);
    }

    log::info!("Starting showcase-gateway...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );
    if config.impersonation_enabled() {
        log::warn!("Dev impersonation cookie is ENABLED");
    }

    // 4. Shared outbound HTTP client
    let http_client =
        config::init_http_client(&config).context("failed to build outbound HTTP client")?;
    let backend = BackendClient::from_config(http_client.clone(), &config);
    let github = web::Data::new(GitHubClient::new(
        http_client,
        config.github_api_url.clone(),
    ));

    // 5. Sessions and login rate limiting
    let sessions = Arc::new(SessionStore::new(config.session_ttl_secs));
    start_cleanup_task(sessions.clone(), SESSION_CLEANUP_INTERVAL_SECS);
    log::info!(
        "Session store ready (TTL: {}s, cleanup every {}s)",
        config.session_ttl_secs,
        SESSION_CLEANUP_INTERVAL_SECS
    );

    let limiter = web::Data::new(LoginLimiter::new(config.login_rate_per_minute));
    start_sweeper_task(limiter.clone().into_inner(), SESSION_CLEANUP_INTERVAL_SECS);

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let max_body_bytes = config.max_body_bytes;

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(backend.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(github.clone())
            .app_data(limiter.clone())
            // Extractor error handling
            .app_data(
                web::JsonConfig::default()
                    .limit(max_body_bytes)
                    .error_handler(json_error_handler),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes (specific /api prefixes before the proxy scope)
            .configure(handlers::health_config)
            .configure(handlers::auth_config)
            .configure(handlers::layout_config)
            .configure(handlers::fixtures_config)
            .configure(handlers::proxy_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await
    .context("HTTP server terminated with an error")
}
