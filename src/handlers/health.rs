// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::services::{BackendClient, SessionStore};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

pub async fn health_check(
    backend: web::Data<BackendClient>,
    sessions: web::Data<Arc<SessionStore>>,
) -> impl Responder {
    let stats = sessions.stats().await;

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "showcase-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "backend_configured": backend.is_configured(),
        "active_sessions": stats.active_sessions
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
