// src/models/belt.rs
// DOCUMENTATION: Belt/marquee layout models
// PURPOSE: Options and results for keyword belt chunking

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_BELT_CAP: usize = 24;
pub const DEFAULT_BELT_CHUNK_SIZE: usize = 8;
pub const DEFAULT_MIN_LAST_BELT_SIZE: usize = 4;

/// Chunking parameters
/// DOCUMENTATION: Shared by the JSON body and the query-string variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BeltOptions {
    /// Maximum number of distinct items kept
    #[serde(default = "default_cap")]
    #[validate(range(min = 1, max = 500))]
    pub cap: usize,

    /// Target items per belt
    #[serde(default = "default_chunk_size")]
    #[validate(range(min = 1, max = 100))]
    pub chunk_size: usize,

    /// Smallest belt allowed after rebalancing
    #[serde(default = "default_min_last")]
    #[validate(range(max = 100))]
    pub min_last: usize,
}

impl Default for BeltOptions {
    fn default() -> Self {
        Self {
            cap: DEFAULT_BELT_CAP,
            chunk_size: DEFAULT_BELT_CHUNK_SIZE,
            min_last: DEFAULT_MIN_LAST_BELT_SIZE,
        }
    }
}

fn default_cap() -> usize {
    DEFAULT_BELT_CAP
}

fn default_chunk_size() -> usize {
    DEFAULT_BELT_CHUNK_SIZE
}

fn default_min_last() -> usize {
    DEFAULT_MIN_LAST_BELT_SIZE
}

/// Request body for POST /api/layout/belts
#[derive(Debug, Deserialize, Validate)]
pub struct BeltRequest {
    pub items: Vec<String>,

    #[serde(flatten)]
    #[validate]
    pub options: BeltOptions,
}

/// Chunked belts ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeltLayout {
    pub belts: Vec<Vec<String>>,
    /// Items across all belts after dedupe and cap
    pub total: usize,
}
