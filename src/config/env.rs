// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8003)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Base URL of the backend API (e.g., "https://api.example.com")
    /// None means the proxy answers 503 for every forwarded request
    pub backend_api_url: Option<String>,

    /// Bearer token injected into every backend request
    pub backend_api_token: Option<String>,

    /// Timeout for outbound HTTP calls in seconds
    pub backend_timeout_secs: u64,

    /// GitHub REST API base URL
    pub github_api_url: String,

    /// Session lifetime in seconds
    pub session_ttl_secs: u64,

    /// Allow the `dev_impersonate` cookie (development only)
    pub dev_impersonation: bool,

    /// Serve /api/{data,profiles,clusters}.json from disk
    pub serve_fixtures: bool,

    /// Directory holding the JSON fixtures
    pub fixtures_dir: PathBuf,

    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,

    /// Session creations allowed per client per minute
    pub login_rate_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_address: "127.0.0.1".to_string(),
            server_port: 8003,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            backend_api_url: None,
            backend_api_token: None,
            backend_timeout_secs: 10,
            github_api_url: "https://api.github.com".to_string(),
            session_ttl_secs: 7 * 24 * 3600,
            dev_impersonation: false,
            serve_fixtures: true,
            fixtures_dir: PathBuf::from("fixtures"),
            max_body_bytes: 1024 * 1024,
            login_rate_per_minute: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let is_development = environment == "development";

        Config {
            server_address: env::var("SERVER_ADDRESS").unwrap_or(defaults.server_address),

            server_port: parse_var("SERVER_PORT", defaults.server_port),

            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),

            backend_api_url: non_empty_var("BACKEND_API_URL")
                .map(|url| url.trim_end_matches('/').to_string()),

            backend_api_token: non_empty_var("BACKEND_API_TOKEN"),

            backend_timeout_secs: parse_var("BACKEND_TIMEOUT_SECS", defaults.backend_timeout_secs),

            github_api_url: non_empty_var("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.github_api_url),

            session_ttl_secs: parse_var("SESSION_TTL_SECS", defaults.session_ttl_secs),

            dev_impersonation: parse_var("DEV_IMPERSONATION", false),

            serve_fixtures: parse_var("SERVE_FIXTURES", is_development),

            fixtures_dir: non_empty_var("FIXTURES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.fixtures_dir),

            max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.max_body_bytes),

            login_rate_per_minute: parse_var(
                "LOGIN_RATE_PER_MINUTE",
                defaults.login_rate_per_minute,
            ),

            environment,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Whether the `dev_impersonate` cookie is honoured
    /// Impersonation never applies outside development, whatever the flag says
    pub fn impersonation_enabled(&self) -> bool {
        self.dev_impersonation && self.is_development()
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        if self.login_rate_per_minute == 0 {
            return Err("LOGIN_RATE_PER_MINUTE must be greater than zero".to_string());
        }

        if self.backend_timeout_secs == 0 {
            return Err("BACKEND_TIMEOUT_SECS must be greater than zero".to_string());
        }

        if self.session_ttl_secs == 0 {
            return Err("SESSION_TTL_SECS must be greater than zero".to_string());
        }

        if let Some(url) = &self.backend_api_url {
            if reqwest::Url::parse(url).is_err() {
                return Err(format!("BACKEND_API_URL is not a valid URL: {}", url));
            }
        } else {
            log::warn!("BACKEND_API_URL not configured - proxy routes will answer 503");
        }

        if self.dev_impersonation && !self.is_development() {
            log::warn!(
                "DEV_IMPERSONATION is set but ENVIRONMENT is '{}' - impersonation stays disabled",
                self.environment
            );
        }

        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
