// src/services/belt_layout.rs
// DOCUMENTATION: Belt/marquee chunking
// PURPOSE: Turn keyword and emphasis tags into balanced auto-scrolling rows

use crate::models::{BeltLayout, BeltOptions};
use serde_json::Value;
use std::collections::HashSet;

/// Belt layout operations
pub struct BeltLayoutService;

impl BeltLayoutService {
    /// Trim, drop empties and dedupe case-insensitively
    /// The first-seen casing wins and input order is kept
    pub fn dedupe<I, S>(items: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();

        for item in items {
            let trimmed = item.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.to_lowercase()) {
                unique.push(trimmed.to_string());
            }
        }

        unique
    }

    /// Split into `chunk_size` pieces, then rebalance right to left so no
    /// belt ends up shorter than `min_last`
    pub fn chunk(items: Vec<String>, chunk_size: usize, min_last: usize) -> Vec<Vec<String>> {
        let chunk_size = chunk_size.max(1);
        let mut belts: Vec<Vec<String>> = items
            .chunks(chunk_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        let mut i = belts.len();
        while i > 1 {
            i -= 1;
            if belts[i].len() >= min_last {
                continue;
            }

            // Borrow from the left neighbour while it can spare items
            while belts[i].len() < min_last && belts[i - 1].len() > min_last {
                if let Some(moved) = belts[i - 1].pop() {
                    belts[i].insert(0, moved);
                }
            }

            if belts[i].len() < min_last {
                let short = belts.remove(i);
                belts[i - 1].extend(short);
            }
        }

        if belts.len() > 1 && belts[0].len() < min_last {
            let second = belts.remove(1);
            belts[0].extend(second);
        }

        belts
    }

    /// Dedupe, cap and chunk
    pub fn build_belts<I, S>(items: I, options: &BeltOptions) -> BeltLayout
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique = Self::dedupe(items);
        unique.truncate(options.cap);

        let total = unique.len();
        let belts = Self::chunk(unique, options.chunk_size, options.min_last);

        log::debug!(
            "Built {} belts from {} items (chunk_size={}, min_last={})",
            belts.len(),
            total,
            options.chunk_size,
            options.min_last
        );

        BeltLayout { belts, total }
    }

    /// Collect belt tags from a builder profile
    /// DOCUMENTATION: keywords first, then emphasis tags; `theme.*` takes
    /// precedence over top-level fields
    pub fn profile_tags(profile: &Value) -> Vec<String> {
        let mut tags = Vec::new();

        for field in ["keywords", "emphasis"] {
            let values = profile
                .pointer(&format!("/theme/{}", field))
                .or_else(|| profile.get(field))
                .and_then(Value::as_array);

            if let Some(values) = values {
                tags.extend(values.iter().filter_map(Value::as_str).map(str::to_string));
            }
        }

        tags
    }
}
