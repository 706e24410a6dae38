// src/db/photographer_repository.rs
// DOCUMENTATION: Photographer database operations
// PURPOSE: Listing with photo counts, lookup, and find-or-create for imports

use super::photo_repository::like_pattern;
use crate::errors::{map_db_error, ApiError};
use crate::models::{Page, Photographer};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

const PHOTOGRAPHER_SELECT: &str = r#"
    SELECT ph.id, ph.pexels_id, ph.name, ph.url, ph.created_at, ph.updated_at,
           (SELECT COUNT(*) FROM photos p WHERE p.photographer_id = ph.id) AS photo_count
    FROM photographers ph
"#;

fn push_search<'a>(builder: &mut QueryBuilder<'a, Postgres>, search: Option<&'a str>) {
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        builder.push(" WHERE ph.name ILIKE ");
        builder.push_bind(like_pattern(search));
    }
}

pub struct PhotographerRepository;

impl PhotographerRepository {
    /// Name-ordered page of photographers, optionally filtered by name
    pub async fn list_photographers(
        pool: &PgPool,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<Photographer>, i64), ApiError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM photographers ph");
        push_search(&mut count, search);

        let (total,): (i64,) = count
            .build_query_as::<(i64,)>()
            .fetch_one(pool)
            .await
            .map_err(|e| map_db_error("count photographers", e))?;

        let mut select = QueryBuilder::<Postgres>::new(PHOTOGRAPHER_SELECT);
        push_search(&mut select, search);
        select.push(" ORDER BY ph.name ASC, ph.id ASC LIMIT ");
        select.push_bind(page.limit());
        select.push(" OFFSET ");
        select.push_bind(page.offset());

        let photographers = select
            .build_query_as::<Photographer>()
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("list photographers", e))?;

        Ok((photographers, total))
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Photographer>, ApiError> {
        let sql = format!("{} WHERE ph.id = $1", PHOTOGRAPHER_SELECT);
        sqlx::query_as::<_, Photographer>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("find photographer", e))
    }

    pub async fn get_photographer(pool: &PgPool, id: i64) -> Result<Photographer, ApiError> {
        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            log::warn!("Photographer not found: {}", id);
            ApiError::NotFound("Photographer".to_string())
        })
    }

    /// Look up by Pexels id, inserting when absent
    /// Returns the photographer id and whether a row was created
    pub async fn find_or_create_by_pexels_id(
        conn: &mut PgConnection,
        pexels_id: i32,
        name: &str,
        url: Option<&str>,
    ) -> Result<(i64, bool), ApiError> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM photographers WHERE pexels_id = $1")
                .bind(pexels_id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| map_db_error("find photographer by pexels id", e))?;

        if let Some((id,)) = existing {
            return Ok((id, false));
        }

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO photographers (pexels_id, name, url) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(pexels_id)
        .bind(name)
        .bind(url)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_db_error("create photographer", e))?;

        log::debug!("Created photographer {} (pexels {})", id, pexels_id);
        Ok((id, true))
    }
}
