// src/db/user_repository.rs
// DOCUMENTATION: User account database operations
// PURPOSE: Lookup, creation and profile updates for the users table

use crate::errors::{map_db_error, ApiError};
use crate::models::{UpdateProfileRequest, User, UserProfile, UserRole};
use sqlx::PgPool;

const USER_COLUMNS: &str = r#"
    u.id, u.username, u.email, u.password_digest, u.bio, u.avatar_url,
    u.role, u.created_at, u.updated_at
"#;

pub struct UserRepository;

impl UserRepository {
    /// Insert a new account; email is stored lowercase
    pub async fn create_user(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_digest: &str,
        role: UserRole,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_digest, role)
            VALUES ($1, LOWER($2), $3, $4)
            RETURNING id, username, email, password_digest, bio, avatar_url,
                      role, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_digest)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("create user", e))?;

        log::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users u WHERE u.id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("find user", e))
    }

    /// Case-insensitive email lookup used by login
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let sql = format!(
            "SELECT {} FROM users u WHERE LOWER(u.email) = LOWER($1)",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("find user by email", e))
    }

    /// User with photo and favorite counters
    pub async fn get_profile(pool: &PgPool, id: i64) -> Result<UserProfile, ApiError> {
        let sql = format!(
            r#"
            SELECT {},
                (SELECT COUNT(*) FROM photos p WHERE p.created_by_id = u.id) AS photo_count,
                (SELECT COUNT(*) FROM favorites f WHERE f.user_id = u.id) AS favorite_count
            FROM users u
            WHERE u.id = $1
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("load user profile", e))?
            .ok_or_else(|| {
                log::warn!("User not found: {}", id);
                ApiError::NotFound("User".to_string())
            })
    }

    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, ApiError> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE LOWER(email) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("check email", e))?;

        Ok(taken)
    }

    pub async fn username_taken(
        pool: &PgPool,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, ApiError> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE LOWER(username) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("check username", e))?;

        Ok(taken)
    }

    /// Partial update - only provided fields are modified
    pub async fn update_profile(
        pool: &PgPool,
        id: i64,
        req: &UpdateProfileRequest,
    ) -> Result<(), ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                bio = COALESCE($2, bio),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&req.username)
        .bind(&req.bio)
        .bind(&req.avatar_url)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| map_db_error("update profile", e))?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound("User".to_string()));
        }

        log::info!("Updated profile for user {}", id);
        Ok(())
    }
}
