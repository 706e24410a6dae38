// src/models/photographer.rs
// DOCUMENTATION: Photographers imported from Pexels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::timestamps::iso8601;
use super::{PaginationMeta, PhotoResponse};

#[derive(Debug, Clone, FromRow)]
pub struct Photographer {
    pub id: i64,
    pub pexels_id: i32,
    pub name: String,
    pub url: Option<String>,
    pub photo_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotographerResponse {
    pub id: i64,
    pub pexels_id: i32,
    pub name: String,
    pub url: Option<String>,
    pub photo_count: i64,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<PhotoResponse>>,
}

impl Photographer {
    pub fn to_response(&self) -> PhotographerResponse {
        PhotographerResponse {
            id: self.id,
            pexels_id: self.pexels_id,
            name: self.name.clone(),
            url: self.url.clone(),
            photo_count: self.photo_count,
            created_at: self.created_at,
            photos: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotographerListResponse {
    pub photographers: Vec<PhotographerResponse>,
    pub meta: PaginationMeta,
}

/// GET /photographers query string
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PhotographerQuery {
    /// Case-insensitive match on name
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
