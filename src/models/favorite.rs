// src/models/favorite.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::timestamps::iso8601;
use super::{PaginationMeta, Photo, PhotoResponse};

/// A favorite row joined with the favorited photo
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteEntry {
    pub favorite_id: i64,
    pub favorited_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub photo: Photo,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteResponse {
    pub id: i64,
    pub photo: PhotoResponse,
    #[serde(serialize_with = "iso8601")]
    pub favorited_at: DateTime<Utc>,
}

impl FavoriteEntry {
    pub fn to_response(&self) -> FavoriteResponse {
        FavoriteResponse {
            id: self.favorite_id,
            photo: self.photo.to_response(true),
            favorited_at: self.favorited_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteListResponse {
    pub favorites: Vec<FavoriteResponse>,
    pub meta: PaginationMeta,
}
