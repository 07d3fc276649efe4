// src/handlers/layout.rs
// DOCUMENTATION: Pure layout endpoints
// PURPOSE: Expose gallery grouping and belt chunking to callers holding their own data

use crate::errors::GatewayError;
use crate::models::{BeltRequest, TimelineRequest, TimelineResponse};
use crate::services::{BeltLayoutService, GalleryTimeline};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// POST /api/layout/belts
/// Dedupe, cap and chunk a list of tags into belts
pub async fn belts(body: web::Json<BeltRequest>) -> Result<impl Responder, GatewayError> {
    body.validate()?;

    let request = body.into_inner();
    let layout = BeltLayoutService::build_belts(request.items, &request.options);
    Ok(HttpResponse::Ok().json(layout))
}

/// POST /api/layout/gallery-timeline
/// Group supplied gallery images by local calendar day
pub async fn gallery_timeline(
    body: web::Json<TimelineRequest>,
) -> Result<impl Responder, GatewayError> {
    let request = body.into_inner();
    let offset = GalleryTimeline::offset_from_minutes(request.tz_offset_minutes)?;

    let total_images = request.images.len();
    let groups = GalleryTimeline::group_by_date(request.images, &offset);

    Ok(HttpResponse::Ok().json(TimelineResponse {
        groups,
        total_images,
    }))
}

/// Configuration for layout routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/layout")
            .route("/belts", web::post().to(belts))
            .route("/gallery-timeline", web::post().to(gallery_timeline)),
    );
}
