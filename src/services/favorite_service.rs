// src/services/favorite_service.rs

use crate::db::FavoriteRepository;
use crate::errors::ApiError;
use crate::models::*;
use sqlx::PgPool;

pub struct FavoriteService;

impl FavoriteService {
    /// The user's favorites, newest first
    pub async fn list_favorites(
        pool: &PgPool,
        user: &User,
        params: &PaginationParams,
    ) -> Result<FavoriteListResponse, ApiError> {
        let page = Page::from(params);
        let (favorites, total) = FavoriteRepository::list_for_user(pool, user.id, page).await?;

        Ok(FavoriteListResponse {
            favorites: favorites.iter().map(FavoriteEntry::to_response).collect(),
            meta: page.meta(total),
        })
    }
}
