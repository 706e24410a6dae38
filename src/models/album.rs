// src/models/album.rs
// DOCUMENTATION: User-curated photo albums
// PURPOSE: Album rows, request DTOs and the API view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::timestamps::iso8601;
use super::{PaginationMeta, PhotoResponse, User, UserSummary};

/// Album joined with owner username and photo count
#[derive(Debug, Clone, FromRow)]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub owner_username: String,
    pub is_public: bool,
    pub photo_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Album {
    /// Owners see their own albums; everyone sees public ones
    pub fn is_visible_to(&self, user: &User) -> bool {
        self.is_public || self.owner_id == user.id
    }

    /// Owners and admins may change an album
    pub fn is_editable_by(&self, user: &User) -> bool {
        self.owner_id == user.id || user.is_admin()
    }

    pub fn to_response(&self) -> AlbumResponse {
        AlbumResponse {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            is_public: self.is_public,
            owner: UserSummary {
                id: self.owner_id,
                username: self.owner_username.clone(),
            },
            photo_count: self.photo_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
            photos: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub owner: UserSummary,
    pub photo_count: i64,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<PhotoResponse>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumListResponse {
    pub albums: Vec<AlbumResponse>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateAlbumRequest {
    #[validate(
        required(message = "can't be blank"),
        length(min = 1, max = 100, message = "must be between 1 and 100 characters")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAlbumRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}
