// src/services/photographer_service.rs
// DOCUMENTATION: Read-only photographer listing and detail

use crate::db::{PhotoRepository, PhotographerRepository};
use crate::errors::ApiError;
use crate::models::*;
use crate::services::PhotoService;
use sqlx::PgPool;

pub struct PhotographerService;

impl PhotographerService {
    pub async fn list_photographers(
        pool: &PgPool,
        query: &PhotographerQuery,
    ) -> Result<PhotographerListResponse, ApiError> {
        let page = Page::from_params(query.page, query.per_page);
        let (photographers, total) =
            PhotographerRepository::list_photographers(pool, query.search.as_deref(), page).await?;

        Ok(PhotographerListResponse {
            photographers: photographers.iter().map(Photographer::to_response).collect(),
            meta: page.meta(total),
        })
    }

    /// Photographer with all of their photos in compact form
    pub async fn get_photographer(
        pool: &PgPool,
        id: i64,
        viewer: Option<&User>,
    ) -> Result<PhotographerResponse, ApiError> {
        let photographer = PhotographerRepository::get_photographer(pool, id).await?;
        let photos = PhotoRepository::list_by_photographer(pool, id).await?;

        let mut response = photographer.to_response();
        response.photos = Some(PhotoService::compact_views(pool, photos, viewer).await?);
        Ok(response)
    }
}
