// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Route table, extractor error handling and shared middleware

pub mod albums;
pub mod auth;
pub mod extractors;
pub mod favorites;
pub mod health;
pub mod middleware;
pub mod photographers;
pub mod photos;

use crate::errors::ApiError;
use actix_web::{web, HttpResponse};

pub use extractors::{AuthUser, OptionalUser};
pub use middleware::{rate_limit, request_id, RequestId, REQUEST_ID_HEADER};

/// Register every route plus the extractor error handlers
/// DOCUMENTATION: Used by main.rs and the HTTP tests so both see the same app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .configure(health::config)
        .service(
            web::scope("/api/v1")
                .configure(auth::config)
                .configure(photos::config)
                .configure(photographers::config)
                .configure(albums::config)
                .configure(favorites::config),
        );
}

/// Malformed bodies answer 400 in the usual error envelope
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        log::debug!("Rejected body for {}: {}", req.path(), err);
        ApiError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        log::debug!("Rejected query for {}: {}", req.path(), err);
        ApiError::BadRequest(format!("Invalid query parameters: {}", err)).into()
    })
}

/// Non-numeric ids cannot match a record
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_, _| ApiError::NotFound("Resource".to_string()).into())
}

/// Default service for unknown routes
pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound("Resource".to_string()))
}
