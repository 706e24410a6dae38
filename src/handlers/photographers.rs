// src/handlers/photographers.rs
// DOCUMENTATION: HTTP handlers for photographers (read only)

use crate::errors::ApiError;
use crate::handlers::extractors::OptionalUser;
use crate::models::PhotographerQuery;
use crate::services::PhotographerService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// GET /photographers
pub async fn list_photographers(
    pool: web::Data<PgPool>,
    query: web::Query<PhotographerQuery>,
) -> Result<impl Responder, ApiError> {
    let result = PhotographerService::list_photographers(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /photographers/{id}
pub async fn get_photographer(
    pool: web::Data<PgPool>,
    viewer: OptionalUser,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let photographer =
        PhotographerService::get_photographer(pool.get_ref(), path.into_inner(), viewer.user())
            .await?;
    Ok(HttpResponse::Ok().json(json!({ "photographer": photographer })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/photographers")
            .route("", web::get().to(list_photographers))
            .route("/{id}", web::get().to(get_photographer)),
    );
}
