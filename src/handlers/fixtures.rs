// src/handlers/fixtures.rs
// DOCUMENTATION: Static JSON fixtures for local development
// PURPOSE: Serve mock directory data without a running backend

use crate::config::Config;
use crate::errors::GatewayError;
use actix_web::{web, HttpResponse, Responder};
use serde_json::Value;

/// Fixture files that may be served
pub const FIXTURE_FILES: [&str; 3] = ["data.json", "profiles.json", "clusters.json"];

/// GET /api/{data,profiles,clusters}.json
pub async fn serve_fixture(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<impl Responder, GatewayError> {
    let name = path.into_inner();

    if !config.serve_fixtures || !FIXTURE_FILES.contains(&name.as_str()) {
        return Err(GatewayError::NotFound(format!("/api/{}", name)));
    }

    let file = config.fixtures_dir.join(&name);
    let raw = tokio::fs::read(&file).await.map_err(|e| {
        log::error!("Failed to read fixture {}: {}", file.display(), e);
        GatewayError::InternalError(format!("fixture {} unavailable", name))
    })?;

    let value: Value = serde_json::from_slice(&raw).map_err(|e| {
        log::error!("Fixture {} is not valid JSON: {}", file.display(), e);
        GatewayError::InternalError(format!("fixture {} is malformed", name))
    })?;

    Ok(HttpResponse::Ok().json(value))
}

/// Configuration for fixture routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/api/{fixture:[a-z_-]+\\.json}",
        web::get().to(serve_fixture),
    );
}
