// src/db/album_repository.rs
// DOCUMENTATION: Album database operations
// PURPOSE: Album CRUD, visibility-scoped listing and photo membership

use crate::errors::{map_db_error, ApiError};
use crate::models::{Album, CreateAlbumRequest, Page, UpdateAlbumRequest};
use sqlx::PgPool;

const ALBUM_SELECT: &str = r#"
    SELECT a.id, a.name, a.description, a.owner_id, u.username AS owner_username,
           a.is_public, a.created_at, a.updated_at,
           (SELECT COUNT(*) FROM albums_photos ap WHERE ap.album_id = a.id) AS photo_count
    FROM albums a
    JOIN users u ON u.id = a.owner_id
"#;

pub struct AlbumRepository;

impl AlbumRepository {
    /// Albums owned by the viewer plus every public album, newest first
    pub async fn list_visible(
        pool: &PgPool,
        viewer_id: i64,
        page: Page,
    ) -> Result<(Vec<Album>, i64), ApiError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM albums a WHERE a.owner_id = $1 OR a.is_public",
        )
        .bind(viewer_id)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("count albums", e))?;

        let sql = format!(
            "{} WHERE a.owner_id = $1 OR a.is_public ORDER BY a.created_at DESC, a.id DESC LIMIT $2 OFFSET $3",
            ALBUM_SELECT
        );
        let albums = sqlx::query_as::<_, Album>(&sql)
            .bind(viewer_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("list albums", e))?;

        Ok((albums, total))
    }

    pub async fn get_album(pool: &PgPool, id: i64) -> Result<Album, ApiError> {
        let sql = format!("{} WHERE a.id = $1", ALBUM_SELECT);
        sqlx::query_as::<_, Album>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("find album", e))?
            .ok_or_else(|| ApiError::NotFound("Album".to_string()))
    }

    pub async fn create_album(
        pool: &PgPool,
        owner_id: i64,
        req: &CreateAlbumRequest,
    ) -> Result<Album, ApiError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO albums (name, description, owner_id, is_public)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(owner_id)
        .bind(req.is_public.unwrap_or(false))
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("create album", e))?;

        log::info!("User {} created album {}", owner_id, id);
        Self::get_album(pool, id).await
    }

    pub async fn update_album(
        pool: &PgPool,
        id: i64,
        req: &UpdateAlbumRequest,
    ) -> Result<Album, ApiError> {
        sqlx::query(
            r#"
            UPDATE albums
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                is_public = COALESCE($3, is_public),
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.is_public)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| map_db_error("update album", e))?;

        Self::get_album(pool, id).await
    }

    pub async fn delete_album(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| map_db_error("delete album", e))?
            .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("Album".to_string()));
        }

        log::info!("Deleted album {}", id);
        Ok(())
    }

    /// Adding a photo twice is a no-op
    pub async fn add_photo(pool: &PgPool, album_id: i64, photo_id: i64) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO albums_photos (album_id, photo_id)
            VALUES ($1, $2)
            ON CONFLICT (album_id, photo_id) DO NOTHING
            "#,
        )
        .bind(album_id)
        .bind(photo_id)
        .execute(pool)
        .await
        .map_err(|e| map_db_error("add photo to album", e))?;

        Ok(())
    }

    /// Removing a photo that is not in the album is a no-op
    pub async fn remove_photo(pool: &PgPool, album_id: i64, photo_id: i64) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM albums_photos WHERE album_id = $1 AND photo_id = $2")
            .bind(album_id)
            .bind(photo_id)
            .execute(pool)
            .await
            .map_err(|e| map_db_error("remove photo from album", e))?;

        Ok(())
    }
}
