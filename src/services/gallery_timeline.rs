// src/services/gallery_timeline.rs
// DOCUMENTATION: Gallery timeline grouping
// PURPOSE: Bucket gallery images by local calendar day, newest day first

use crate::errors::GatewayError;
use crate::models::{GalleryGroup, GalleryImage};
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;

pub const UNKNOWN_DATE_KEY: &str = "Unknown";
const UNKNOWN_DATE_LABEL: &str = "Unknown date";

/// Largest UTC offset in use anywhere (UTC+14 / UTC-12 rounded out)
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Gallery timeline operations
pub struct GalleryTimeline;

impl GalleryTimeline {
    /// Build a fixed offset from minutes east of UTC
    pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, GatewayError> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(GatewayError::ValidationError(format!(
                "tz_offset_minutes must be within ±{}, got {}",
                MAX_OFFSET_MINUTES, minutes
            )));
        }

        FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            GatewayError::ValidationError(format!("Invalid tz_offset_minutes: {}", minutes))
        })
    }

    /// Calendar day of a millisecond timestamp in the given offset
    /// Returns None for non-finite or out-of-range timestamps
    pub fn local_day(taken_at: f64, offset: &FixedOffset) -> Option<NaiveDate> {
        if !taken_at.is_finite() || taken_at.abs() >= i64::MAX as f64 {
            return None;
        }

        let millis = taken_at.trunc() as i64;
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|utc| utc.with_timezone(offset).date_naive())
    }

    /// Group images by local calendar day
    ///
    /// DOCUMENTATION:
    /// - dated buckets are sorted descending (most recent day first)
    /// - undated images go into a trailing "Unknown" bucket
    /// - images keep their input order inside a bucket
    pub fn group_by_date(images: Vec<GalleryImage>, offset: &FixedOffset) -> Vec<GalleryGroup> {
        let mut dated: BTreeMap<NaiveDate, Vec<GalleryImage>> = BTreeMap::new();
        let mut unknown = Vec::new();

        for image in images {
            match image.taken_at.and_then(|ts| Self::local_day(ts, offset)) {
                Some(day) => dated.entry(day).or_default().push(image),
                None => unknown.push(image),
            }
        }

        let mut groups: Vec<GalleryGroup> = dated
            .into_iter()
            .rev()
            .map(|(day, images)| GalleryGroup {
                date: day.format("%Y-%m-%d").to_string(),
                label: day.format("%A, %B %-d, %Y").to_string(),
                images,
            })
            .collect();

        if !unknown.is_empty() {
            groups.push(GalleryGroup {
                date: UNKNOWN_DATE_KEY.to_string(),
                label: UNKNOWN_DATE_LABEL.to_string(),
                images: unknown,
            });
        }

        log::debug!("Grouped gallery into {} day buckets", groups.len());
        groups
    }
}
