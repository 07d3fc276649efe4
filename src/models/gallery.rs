// src/models/gallery.rs
// DOCUMENTATION: Gallery view-models
// PURPOSE: Image records passed through the timeline grouping

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One gallery image as returned by the backend
/// DOCUMENTATION: Accepts snake_case and camelCase input, always emits snake_case
/// Fields this service does not interpret are carried through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,

    #[serde(default)]
    pub alt: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub caption: Option<String>,

    /// `null` or a non-boolean counts as not highlighted
    #[serde(default, alias = "isHighlight", deserialize_with = "lenient_flag")]
    pub is_highlight: bool,

    /// Capture time as a Unix timestamp in milliseconds
    /// Numeric strings and RFC 3339 strings are accepted; anything else reads as undated
    #[serde(default, alias = "takenAt", deserialize_with = "lenient_timestamp")]
    pub taken_at: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<f64>().ok().or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.timestamp_millis() as f64)
            })
        }
        _ => None,
    })
}

#[cfg(test)]
impl GalleryImage {
    pub fn new(url: impl Into<String>, taken_at: Option<f64>) -> Self {
        Self {
            url: url.into(),
            alt: None,
            title: None,
            caption: None,
            is_highlight: false,
            taken_at,
            extra: Map::new(),
        }
    }
}

/// Images sharing one calendar day
#[derive(Debug, Clone, Serialize)]
pub struct GalleryGroup {
    /// `YYYY-MM-DD`, or `Unknown` for undated images
    pub date: String,
    /// Display label, e.g. "Sunday, October 18, 2026"
    pub label: String,
    pub images: Vec<GalleryImage>,
}

/// Backend gallery payload: either a bare array or `{ "images": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GalleryPayload {
    List(Vec<GalleryImage>),
    Wrapped { images: Vec<GalleryImage> },
}

impl GalleryPayload {
    pub fn into_images(self) -> Vec<GalleryImage> {
        match self {
            GalleryPayload::List(images) => images,
            GalleryPayload::Wrapped { images } => images,
        }
    }
}

/// Request body for POST /api/layout/gallery-timeline
#[derive(Debug, Deserialize)]
pub struct TimelineRequest {
    pub images: Vec<GalleryImage>,

    /// Minutes east of UTC used to pick the calendar day
    #[serde(default)]
    pub tz_offset_minutes: i32,
}

/// Query string for the proxied timeline endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    #[serde(default)]
    pub tz_offset_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub groups: Vec<GalleryGroup>,
    pub total_images: usize,
}
