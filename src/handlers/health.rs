// src/handlers/health.rs
// DOCUMENTATION: Liveness and status endpoints
// PURPOSE: /up for load balancers, /health for humans

use crate::services::TokenBlacklist;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// GET /up
pub async fn up() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

/// GET /health
pub async fn health_check(blacklist: Option<web::Data<TokenBlacklist>>) -> impl Responder {
    let revocation_store = blacklist.map(|b| b.backend()).unwrap_or("none");

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "photo-gallery-api",
        "version": env!("CARGO_PKG_VERSION"),
        "revocation_store": revocation_store
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/up", web::get().to(up))
        .route("/health", web::get().to(health_check));
}
