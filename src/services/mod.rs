// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod backend_client;
pub mod belt_layout;
pub mod gallery_timeline;
pub mod github_client;
pub mod login_limiter;
pub mod session_store;

pub use backend_client::*;
pub use belt_layout::*;
pub use gallery_timeline::*;
pub use github_client::*;
pub use login_limiter::*;
pub use session_store::*;
