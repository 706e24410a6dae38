// src/services/album_service.rs
// DOCUMENTATION: Album business logic
// PURPOSE: Visibility and ownership rules around the album repository
//
// Viewing:  owner or public album
// Changing: owner or admin (update, delete, add/remove photos)

use crate::db::{AlbumRepository, PhotoRepository};
use crate::errors::ApiError;
use crate::models::*;
use crate::services::PhotoService;
use sqlx::PgPool;
use validator::Validate;

pub struct AlbumService;

impl AlbumService {
    pub async fn list_albums(
        pool: &PgPool,
        user: &User,
        params: &PaginationParams,
    ) -> Result<AlbumListResponse, ApiError> {
        let page = Page::from(params);
        let (albums, total) = AlbumRepository::list_visible(pool, user.id, page).await?;

        Ok(AlbumListResponse {
            albums: albums.iter().map(Album::to_response).collect(),
            meta: page.meta(total),
        })
    }

    pub async fn get_album(pool: &PgPool, user: &User, id: i64) -> Result<AlbumResponse, ApiError> {
        let album = AlbumRepository::get_album(pool, id).await?;
        if !album.is_visible_to(user) {
            return Err(ApiError::Forbidden);
        }

        let photos = PhotoRepository::list_by_album(pool, album.id).await?;
        let mut response = album.to_response();
        response.photos = Some(PhotoService::compact_views(pool, photos, Some(user)).await?);
        Ok(response)
    }

    pub async fn create_album(
        pool: &PgPool,
        user: &User,
        req: CreateAlbumRequest,
    ) -> Result<AlbumResponse, ApiError> {
        req.validate()
            .map_err(|e| ApiError::from_validation("Album creation failed", &e))?;

        let album = AlbumRepository::create_album(pool, user.id, &req)
            .await
            .map_err(|e| e.with_message("Album creation failed"))?;

        Ok(album.to_response())
    }

    pub async fn update_album(
        pool: &PgPool,
        user: &User,
        id: i64,
        req: UpdateAlbumRequest,
    ) -> Result<AlbumResponse, ApiError> {
        Self::editable_album(pool, user, id).await?;

        req.validate()
            .map_err(|e| ApiError::from_validation("Album update failed", &e))?;

        let album = AlbumRepository::update_album(pool, id, &req)
            .await
            .map_err(|e| e.with_message("Album update failed"))?;

        Ok(album.to_response())
    }

    pub async fn delete_album(pool: &PgPool, user: &User, id: i64) -> Result<(), ApiError> {
        Self::editable_album(pool, user, id).await?;
        AlbumRepository::delete_album(pool, id).await
    }

    pub async fn add_photo(
        pool: &PgPool,
        user: &User,
        album_id: i64,
        photo_id: i64,
    ) -> Result<(), ApiError> {
        Self::editable_album(pool, user, album_id).await?;
        PhotoRepository::get_photo(pool, photo_id).await?;
        AlbumRepository::add_photo(pool, album_id, photo_id).await
    }

    pub async fn remove_photo(
        pool: &PgPool,
        user: &User,
        album_id: i64,
        photo_id: i64,
    ) -> Result<(), ApiError> {
        Self::editable_album(pool, user, album_id).await?;
        PhotoRepository::get_photo(pool, photo_id).await?;
        AlbumRepository::remove_photo(pool, album_id, photo_id).await
    }

    /// 404 when missing, 403 when the user may not change it
    async fn editable_album(pool: &PgPool, user: &User, id: i64) -> Result<Album, ApiError> {
        let album = AlbumRepository::get_album(pool, id).await?;
        if !album.is_editable_by(user) {
            log::warn!("User {} may not modify album {}", user.id, id);
            return Err(ApiError::Forbidden);
        }
        Ok(album)
    }
}
