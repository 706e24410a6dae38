// src/services/photo_service.rs
// DOCUMENTATION: Business logic for photos and favorites
// PURPOSE: Coordinate repositories, permissions and response shaping

use crate::db::{FavoriteRepository, PhotoRepository, PhotographerRepository};
use crate::errors::ApiError;
use crate::models::*;
use sqlx::PgPool;
use validator::Validate;

pub struct PhotoService;

impl PhotoService {
    /// Filtered, sorted page of compact photos
    /// `is_favorited` is only ever true for a signed-in viewer
    pub async fn list_photos(
        pool: &PgPool,
        query: &PhotoQuery,
        viewer: Option<&User>,
    ) -> Result<PhotoListResponse, ApiError> {
        let page = Page::from_params(query.page, query.per_page);
        let sort = PhotoSort::parse(query.sort.as_deref());

        let (photos, total) = PhotoRepository::list_photos(pool, query, sort, page).await?;
        let photos = Self::compact_views(pool, photos, viewer).await?;

        Ok(PhotoListResponse {
            photos,
            meta: page.meta(total),
        })
    }

    /// Compact views with the viewer's favorite flags filled in
    pub async fn compact_views(
        pool: &PgPool,
        photos: Vec<Photo>,
        viewer: Option<&User>,
    ) -> Result<Vec<PhotoResponse>, ApiError> {
        let favorited = match viewer {
            Some(user) => {
                let ids: Vec<i64> = photos.iter().map(|p| p.id).collect();
                FavoriteRepository::favorited_ids(pool, user.id, &ids).await?
            }
            None => Default::default(),
        };

        Ok(photos
            .iter()
            .map(|photo| photo.to_response(favorited.contains(&photo.id)))
            .collect())
    }

    pub async fn get_photo(
        pool: &PgPool,
        id: i64,
        viewer: Option<&User>,
    ) -> Result<PhotoDetailResponse, ApiError> {
        let photo = PhotoRepository::get_photo(pool, id).await?;
        Self::detail_view(pool, &photo, viewer).await
    }

    pub async fn create_photo(
        pool: &PgPool,
        user: &User,
        req: CreatePhotoRequest,
    ) -> Result<PhotoDetailResponse, ApiError> {
        req.validate()
            .map_err(|e| ApiError::from_validation("Photo creation failed", &e))?;

        let id = PhotoRepository::create_photo(pool, &req, Some(user.id))
            .await
            .map_err(|e| e.with_message("Photo creation failed"))?;

        log::info!("User {} created photo {}", user.id, id);
        Self::get_photo(pool, id, Some(user)).await
    }

    pub async fn update_photo(
        pool: &PgPool,
        user: &User,
        id: i64,
        req: UpdatePhotoRequest,
    ) -> Result<PhotoDetailResponse, ApiError> {
        let photo = PhotoRepository::get_photo(pool, id).await?;
        if !photo.is_editable_by(user) {
            log::warn!("User {} may not update photo {}", user.id, id);
            return Err(ApiError::Forbidden);
        }

        req.validate()
            .map_err(|e| ApiError::from_validation("Photo update failed", &e))?;

        PhotoRepository::update_photo(pool, id, &req)
            .await
            .map_err(|e| e.with_message("Photo update failed"))?;

        Self::get_photo(pool, id, Some(user)).await
    }

    pub async fn delete_photo(pool: &PgPool, user: &User, id: i64) -> Result<(), ApiError> {
        let photo = PhotoRepository::get_photo(pool, id).await?;
        if !photo.is_editable_by(user) {
            log::warn!("User {} may not delete photo {}", user.id, id);
            return Err(ApiError::Forbidden);
        }

        PhotoRepository::delete_photo(pool, id).await
    }

    /// Returns true when the favorite is new
    pub async fn favorite(pool: &PgPool, user: &User, photo_id: i64) -> Result<bool, ApiError> {
        Self::ensure_exists(pool, photo_id).await?;
        FavoriteRepository::add_favorite(pool, user.id, photo_id).await
    }

    pub async fn unfavorite(pool: &PgPool, user: &User, photo_id: i64) -> Result<(), ApiError> {
        Self::ensure_exists(pool, photo_id).await?;

        if FavoriteRepository::remove_favorite(pool, user.id, photo_id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFoundMessage(
                "Photo is not in your favorites".to_string(),
            ))
        }
    }

    async fn ensure_exists(pool: &PgPool, photo_id: i64) -> Result<(), ApiError> {
        if PhotoRepository::exists(pool, photo_id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Photo".to_string()))
        }
    }

    async fn detail_view(
        pool: &PgPool,
        photo: &Photo,
        viewer: Option<&User>,
    ) -> Result<PhotoDetailResponse, ApiError> {
        let photographer = PhotographerRepository::get_photographer(pool, photo.photographer_id).await?;
        let is_favorited = match viewer {
            Some(user) => FavoriteRepository::is_favorited(pool, user.id, photo.id).await?,
            None => false,
        };

        Ok(photo.to_detail_response(photographer.to_response(), is_favorited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgresql://nobody@localhost:1/none")
            .unwrap()
    }

    fn user() -> User {
        User {
            id: 1,
            username: "creator".to_string(),
            email: "creator@example.com".to_string(),
            password_digest: String::new(),
            bio: None,
            avatar_url: None,
            role: UserRole::Member,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_photo_without_touching_database() {
        let req = CreatePhotoRequest {
            width: Some(0),
            height: Some(100),
            url: Some("https://example.com/p.jpg".to_string()),
            avg_color: Some("blue".to_string()),
            photographer_id: Some(1),
            ..Default::default()
        };

        match PhotoService::create_photo(&lazy_pool(), &user(), req).await {
            Err(ApiError::Unprocessable { message, details }) => {
                assert_eq!(message, "Photo creation failed");
                assert_eq!(
                    details,
                    vec![
                        "Avg color must be a valid hex color".to_string(),
                        "Width must be greater than 0".to_string(),
                    ]
                );
            }
            other => panic!("expected 422, got {:?}", other.map(|p| p.id)),
        }
    }

    #[tokio::test]
    async fn test_anonymous_compact_views_are_not_favorited() {
        let views = PhotoService::compact_views(&lazy_pool(), Vec::new(), None)
            .await
            .unwrap();
        assert!(views.is_empty());
    }
}
