// src/db/photo_repository.rs
// DOCUMENTATION: Photo database operations
// PURPOSE: Filtered listing and CRUD for photos, always joined with
// photographer name and creator username

use crate::errors::{map_db_error, ApiError};
use crate::models::{CreatePhotoRequest, Orientation, Page, Photo, PhotoQuery, PhotoSort, UpdatePhotoRequest};
use sqlx::{PgPool, Postgres, QueryBuilder};

pub(crate) const PHOTO_SELECT: &str = r#"
    SELECT p.id, p.pexels_id, p.width, p.height, p.url, p.avg_color, p.alt,
           p.src_original, p.src_large2x, p.src_large, p.src_medium,
           p.src_small, p.src_portrait, p.src_landscape, p.src_tiny,
           p.photographer_id, ph.name AS photographer_name,
           p.created_by_id, u.username AS created_by_username,
           p.created_at, p.updated_at
    FROM photos p
    JOIN photographers ph ON ph.id = p.photographer_id
    LEFT JOIN users u ON u.id = p.created_by_id
"#;

/// Escape LIKE wildcards in user input and wrap it for a substring match
pub fn like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 2);
    escaped.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Append the WHERE clause for the list filters; blank values are ignored
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a PhotoQuery) {
    builder.push(" WHERE 1=1");

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND p.alt ILIKE ");
        builder.push_bind(like_pattern(search));
    }

    match query.orientation.as_deref().and_then(Orientation::parse) {
        Some(Orientation::Landscape) => {
            builder.push(" AND p.width > p.height");
        }
        Some(Orientation::Portrait) => {
            builder.push(" AND p.height > p.width");
        }
        Some(Orientation::Square) => {
            builder.push(" AND p.width = p.height");
        }
        None => {}
    }

    if let Some(color) = query.color.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND p.avg_color = ");
        builder.push_bind(color);
    }

    if let Some(min_width) = query.min_width {
        builder.push(" AND p.width >= ");
        builder.push_bind(min_width);
    }

    if let Some(min_height) = query.min_height {
        builder.push(" AND p.height >= ");
        builder.push_bind(min_height);
    }

    if let Some(name) = query.photographer.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND ph.name ILIKE ");
        builder.push_bind(like_pattern(name));
    }
}

pub struct PhotoRepository;

impl PhotoRepository {
    /// List photos with filters, sort and pagination
    /// Returns the page of photos plus the total count for the filter
    pub async fn list_photos(
        pool: &PgPool,
        query: &PhotoQuery,
        sort: PhotoSort,
        page: Page,
    ) -> Result<(Vec<Photo>, i64), ApiError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM photos p JOIN photographers ph ON ph.id = p.photographer_id",
        );
        push_filters(&mut count, query);

        let (total,): (i64,) = count
            .build_query_as::<(i64,)>()
            .fetch_one(pool)
            .await
            .map_err(|e| map_db_error("count photos", e))?;

        let mut select = QueryBuilder::<Postgres>::new(PHOTO_SELECT);
        push_filters(&mut select, query);
        select.push(" ORDER BY ");
        select.push(sort.order_by());
        select.push(" LIMIT ");
        select.push_bind(page.limit());
        select.push(" OFFSET ");
        select.push_bind(page.offset());

        let photos = select
            .build_query_as::<Photo>()
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("list photos", e))?;

        log::debug!("Photo list: {} of {} total", photos.len(), total);
        Ok((photos, total))
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Photo>, ApiError> {
        let sql = format!("{} WHERE p.id = $1", PHOTO_SELECT);
        sqlx::query_as::<_, Photo>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("find photo", e))
    }

    pub async fn get_photo(pool: &PgPool, id: i64) -> Result<Photo, ApiError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Photo".to_string()))
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM photos WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(|e| map_db_error("check photo", e))?;
        Ok(exists)
    }

    /// Id of the photo imported from the given Pexels id, if any
    pub async fn find_id_by_pexels_id<'e, E>(
        executor: E,
        pexels_id: i32,
    ) -> Result<Option<i64>, ApiError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM photos WHERE pexels_id = $1")
            .bind(pexels_id)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_db_error("find photo by pexels id", e))?;
        Ok(row.map(|(id,)| id))
    }

    /// Newest-first photos of one photographer
    pub async fn list_by_photographer(
        pool: &PgPool,
        photographer_id: i64,
    ) -> Result<Vec<Photo>, ApiError> {
        let sql = format!(
            "{} WHERE p.photographer_id = $1 ORDER BY p.created_at DESC, p.id DESC",
            PHOTO_SELECT
        );
        sqlx::query_as::<_, Photo>(&sql)
            .bind(photographer_id)
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("list photographer photos", e))
    }

    /// Photos in an album, in the order they were added
    pub async fn list_by_album(pool: &PgPool, album_id: i64) -> Result<Vec<Photo>, ApiError> {
        let sql = format!(
            "{} JOIN albums_photos ap ON ap.photo_id = p.id WHERE ap.album_id = $1 ORDER BY ap.created_at, p.id",
            PHOTO_SELECT
        );
        sqlx::query_as::<_, Photo>(&sql)
            .bind(album_id)
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("list album photos", e))
    }

    /// Insert a photo; `created_by_id` is None for imported photos
    pub async fn create_photo<'e, E>(
        executor: E,
        req: &CreatePhotoRequest,
        created_by_id: Option<i64>,
    ) -> Result<i64, ApiError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO photos (
                pexels_id, width, height, url, avg_color, alt,
                src_original, src_large2x, src_large, src_medium,
                src_small, src_portrait, src_landscape, src_tiny,
                photographer_id, created_by_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(req.pexels_id)
        .bind(req.width)
        .bind(req.height)
        .bind(&req.url)
        .bind(blank_to_none(&req.avg_color))
        .bind(&req.alt)
        .bind(&req.src_original)
        .bind(&req.src_large2x)
        .bind(&req.src_large)
        .bind(&req.src_medium)
        .bind(&req.src_small)
        .bind(&req.src_portrait)
        .bind(&req.src_landscape)
        .bind(&req.src_tiny)
        .bind(req.photographer_id)
        .bind(created_by_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error("create photo", e))?;

        log::info!("Created photo {}", id);
        Ok(id)
    }

    /// Partial update; only provided fields change
    pub async fn update_photo(
        pool: &PgPool,
        id: i64,
        req: &UpdatePhotoRequest,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE photos
            SET pexels_id = COALESCE($1, pexels_id),
                width = COALESCE($2, width),
                height = COALESCE($3, height),
                url = COALESCE($4, url),
                avg_color = COALESCE($5, avg_color),
                alt = COALESCE($6, alt),
                src_original = COALESCE($7, src_original),
                src_large2x = COALESCE($8, src_large2x),
                src_large = COALESCE($9, src_large),
                src_medium = COALESCE($10, src_medium),
                src_small = COALESCE($11, src_small),
                src_portrait = COALESCE($12, src_portrait),
                src_landscape = COALESCE($13, src_landscape),
                src_tiny = COALESCE($14, src_tiny),
                photographer_id = COALESCE($15, photographer_id),
                updated_at = NOW()
            WHERE id = $16
            "#,
        )
        .bind(req.pexels_id)
        .bind(req.width)
        .bind(req.height)
        .bind(&req.url)
        .bind(blank_to_none(&req.avg_color))
        .bind(&req.alt)
        .bind(&req.src_original)
        .bind(&req.src_large2x)
        .bind(&req.src_large)
        .bind(&req.src_medium)
        .bind(&req.src_small)
        .bind(&req.src_portrait)
        .bind(&req.src_landscape)
        .bind(&req.src_tiny)
        .bind(req.photographer_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| map_db_error("update photo", e))?;

        log::info!("Updated photo {}", id);
        Ok(())
    }

    pub async fn delete_photo(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| map_db_error("delete photo", e))?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Photo".to_string()));
        }

        log::info!("Deleted photo {}", id);
        Ok(())
    }
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
