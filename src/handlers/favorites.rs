// src/handlers/favorites.rs

use crate::errors::ApiError;
use crate::handlers::extractors::AuthUser;
use crate::models::PaginationParams;
use crate::services::FavoriteService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /favorites
pub async fn list_favorites(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    query: web::Query<PaginationParams>,
) -> Result<impl Responder, ApiError> {
    let result = FavoriteService::list_favorites(pool.get_ref(), &auth.user, &query).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/favorites", web::get().to(list_favorites));
}
