// src/db/favorite_repository.rs
// DOCUMENTATION: Favorite database operations

use super::photo_repository::PHOTO_SELECT;
use crate::errors::{map_db_error, ApiError};
use crate::models::{FavoriteEntry, Page};
use sqlx::PgPool;
use std::collections::HashSet;

pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Returns true when a new favorite row was inserted
    pub async fn add_favorite(pool: &PgPool, user_id: i64, photo_id: i64) -> Result<bool, ApiError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, photo_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, photo_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(photo_id)
        .execute(pool)
        .await
        .map_err(|e| map_db_error("add favorite", e))?
        .rows_affected();

        Ok(inserted > 0)
    }

    /// Returns false when the photo was not a favorite
    pub async fn remove_favorite(
        pool: &PgPool,
        user_id: i64,
        photo_id: i64,
    ) -> Result<bool, ApiError> {
        let deleted = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND photo_id = $2")
            .bind(user_id)
            .bind(photo_id)
            .execute(pool)
            .await
            .map_err(|e| map_db_error("remove favorite", e))?
            .rows_affected();

        Ok(deleted > 0)
    }

    pub async fn is_favorited(pool: &PgPool, user_id: i64, photo_id: i64) -> Result<bool, ApiError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND photo_id = $2)",
        )
        .bind(user_id)
        .bind(photo_id)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("check favorite", e))?;

        Ok(exists)
    }

    /// Subset of `photo_ids` the user has favorited; one query per page of photos
    pub async fn favorited_ids(
        pool: &PgPool,
        user_id: i64,
        photo_ids: &[i64],
    ) -> Result<HashSet<i64>, ApiError> {
        if photo_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT photo_id FROM favorites WHERE user_id = $1 AND photo_id = ANY($2)",
        )
        .bind(user_id)
        .bind(photo_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| map_db_error("load favorites", e))?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// The user's favorites with their photos, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
        page: Page,
    ) -> Result<(Vec<FavoriteEntry>, i64), ApiError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(|e| map_db_error("count favorites", e))?;

        // PHOTO_SELECT starts with SELECT; splice the favorite columns in after it
        let photo_columns = PHOTO_SELECT.trim_start().trim_start_matches("SELECT");
        let sql = format!(
            r#"
            SELECT f.id AS favorite_id, f.created_at AS favorited_at, {}
            JOIN favorites f ON f.photo_id = p.id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC, f.id DESC
            LIMIT $2 OFFSET $3
            "#,
            photo_columns
        );

        let favorites = sqlx::query_as::<_, FavoriteEntry>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("list favorites", e))?;

        Ok((favorites, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_select_can_be_spliced() {
        let columns = PHOTO_SELECT.trim_start().trim_start_matches("SELECT");
        assert!(columns.trim_start().starts_with("p.id"));
        assert!(columns.contains("FROM photos p"));
    }
}
