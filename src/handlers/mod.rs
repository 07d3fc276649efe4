// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod access;
pub mod auth;
pub mod fixtures;
pub mod health;
pub mod layout;
pub mod proxy;

pub use auth::config as auth_config;
pub use fixtures::config as fixtures_config;
pub use health::config as health_config;
pub use layout::config as layout_config;
pub use proxy::config as proxy_config;
