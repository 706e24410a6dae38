// src/handlers/albums.rs
// DOCUMENTATION: HTTP handlers for albums
// PURPOSE: Every album route requires authentication

use crate::errors::ApiError;
use crate::handlers::extractors::AuthUser;
use crate::models::{CreateAlbumRequest, PaginationParams, UpdateAlbumRequest};
use crate::services::AlbumService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// GET /albums
/// Own albums plus public albums of other users
pub async fn list_albums(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    query: web::Query<PaginationParams>,
) -> Result<impl Responder, ApiError> {
    let result = AlbumService::list_albums(pool.get_ref(), &auth.user, &query).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /albums/{id}
pub async fn get_album(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let album = AlbumService::get_album(pool.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "album": album })))
}

/// POST /albums
pub async fn create_album(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    body: web::Json<CreateAlbumRequest>,
) -> Result<impl Responder, ApiError> {
    let album = AlbumService::create_album(pool.get_ref(), &auth.user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "album": album })))
}

/// PUT /albums/{id}
pub async fn update_album(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<UpdateAlbumRequest>,
) -> Result<impl Responder, ApiError> {
    let album = AlbumService::update_album(
        pool.get_ref(),
        &auth.user,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "album": album })))
}

/// DELETE /albums/{id}
pub async fn delete_album(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    AlbumService::delete_album(pool.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /albums/{id}/photos/{photo_id}
pub async fn add_photo(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, ApiError> {
    let (album_id, photo_id) = path.into_inner();
    AlbumService::add_photo(pool.get_ref(), &auth.user, album_id, photo_id).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Photo added to album",
        "album_id": album_id,
        "photo_id": photo_id
    })))
}

/// DELETE /albums/{id}/photos/{photo_id}
pub async fn remove_photo(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, ApiError> {
    let (album_id, photo_id) = path.into_inner();
    AlbumService::remove_photo(pool.get_ref(), &auth.user, album_id, photo_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Photo removed from album",
        "album_id": album_id,
        "photo_id": photo_id
    })))
}

/// Configuration for album routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/albums")
            .route("", web::get().to(list_albums))
            .route("", web::post().to(create_album))
            .route("/{id}", web::get().to(get_album))
            .route("/{id}", web::put().to(update_album))
            .route("/{id}", web::delete().to(delete_album))
            .route("/{id}/photos/{photo_id}", web::post().to(add_photo))
            .route("/{id}/photos/{photo_id}", web::delete().to(remove_photo)),
    );
}
