// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod belt;
pub mod gallery;
pub mod session;

pub use belt::*;
pub use gallery::*;
pub use session::*;
