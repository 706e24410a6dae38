// src/handlers/photos.rs
// DOCUMENTATION: HTTP handlers for photo operations
// PURPOSE: Parse requests, call services, return responses

use crate::errors::ApiError;
use crate::handlers::extractors::{AuthUser, OptionalUser};
use crate::models::{CreatePhotoRequest, PhotoQuery, UpdatePhotoRequest};
use crate::services::PhotoService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// GET /photos
/// Filters: search, orientation, color, min_width, min_height, photographer
/// Sorting: sort=[-]created_at|width|height
pub async fn list_photos(
    pool: web::Data<PgPool>,
    viewer: OptionalUser,
    query: web::Query<PhotoQuery>,
) -> Result<impl Responder, ApiError> {
    let result = PhotoService::list_photos(pool.get_ref(), &query, viewer.user()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /photos/{id}
pub async fn get_photo(
    pool: web::Data<PgPool>,
    viewer: OptionalUser,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let photo = PhotoService::get_photo(pool.get_ref(), path.into_inner(), viewer.user()).await?;
    Ok(HttpResponse::Ok().json(json!({ "photo": photo })))
}

/// POST /photos
pub async fn create_photo(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    body: web::Json<CreatePhotoRequest>,
) -> Result<impl Responder, ApiError> {
    let photo = PhotoService::create_photo(pool.get_ref(), &auth.user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "photo": photo })))
}

/// PUT /photos/{id}
/// Creator or admin only
pub async fn update_photo(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<UpdatePhotoRequest>,
) -> Result<impl Responder, ApiError> {
    let photo = PhotoService::update_photo(
        pool.get_ref(),
        &auth.user,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "photo": photo })))
}

/// DELETE /photos/{id}
pub async fn delete_photo(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    PhotoService::delete_photo(pool.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /photos/{id}/favorite
/// 201 on first favorite, 200 when it already was one
pub async fn favorite_photo(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let photo_id = path.into_inner();
    let created = PhotoService::favorite(pool.get_ref(), &auth.user, photo_id).await?;

    let body = json!({ "message": "Photo favorited", "photo_id": photo_id });
    if created {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

/// DELETE /photos/{id}/unfavorite
pub async fn unfavorite_photo(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let photo_id = path.into_inner();
    PhotoService::unfavorite(pool.get_ref(), &auth.user, photo_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Photo unfavorited", "photo_id": photo_id })))
}

/// Configuration for photo routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/photos")
            .route("", web::get().to(list_photos))
            .route("", web::post().to(create_photo))
            .route("/{id}", web::get().to(get_photo))
            .route("/{id}", web::put().to(update_photo))
            .route("/{id}", web::delete().to(delete_photo))
            .route("/{id}/favorite", web::post().to(favorite_photo))
            .route("/{id}/unfavorite", web::delete().to(unfavorite_photo)),
    );
}
