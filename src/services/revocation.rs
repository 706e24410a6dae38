// src/services/revocation.rs
// DOCUMENTATION: Token blacklist backed by a key/expiry store
// PURPOSE: Make logout and logout-from-all-devices take effect before tokens expire
//
// Entries:
//   blacklist:token:<sha256(token)>  one revoked token, kept until it would expire
//   blacklist:token:user:<id>        every token of the user issued at or before
//                                    the stored revocation time (milliseconds)
//
// Reads fail open: if the store is unreachable the request proceeds and the
// token still expires naturally.

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

pub const TOKEN_KEY_PREFIX: &str = "blacklist:token:";

/// logout_all keeps its marker for the refresh-token lifetime by default
pub const DEFAULT_USER_REVOCATION_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

#[derive(Error, Debug)]
pub enum RevocationError {
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store with per-entry expiry
/// Values are the unix time (milliseconds) at which the revocation happened
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn put(&self, key: &str, revoked_at: i64, ttl: Duration) -> Result<(), RevocationError>;

    /// Returns the stored revocation time if the entry exists and has not expired
    async fn get(&self, key: &str) -> Result<Option<i64>, RevocationError>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, RevocationError>;

    fn backend(&self) -> &'static str;
}

/// Entry with expiration
#[derive(Clone, Debug)]
struct StoreEntry {
    revoked_at: i64,
    expires_at: Instant,
}

impl StoreEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-process store; entries are lost on restart and not shared between instances
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn put(&self, key: &str, revoked_at: i64, ttl: Duration) -> Result<(), RevocationError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoreEntry {
                revoked_at,
                expires_at: Instant::now() + ttl,
            },
        );
        log::debug!("Revocation SET for key: {} (TTL: {}s)", key, ttl.as_secs());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, RevocationError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.revoked_at))
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        Ok((before - entries.len()) as u64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Shared store in the `revoked_tokens` table; every API instance sees the same entries
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn put(&self, key: &str, revoked_at: i64, ttl: Duration) -> Result<(), RevocationError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
        let expires_at = Utc::now() + ttl;

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (key, revoked_at, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET revoked_at = GREATEST(revoked_tokens.revoked_at, EXCLUDED.revoked_at),
                expires_at = GREATEST(revoked_tokens.expires_at, EXCLUDED.expires_at)
            "#,
        )
        .bind(key)
        .bind(revoked_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, RevocationError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT revoked_at FROM revoked_tokens WHERE key = $1 AND expires_at > NOW()",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        Ok(row.map(|(revoked_at,)| revoked_at))
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        Ok(result.rows_affected())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Token and user revocation on top of a [`RevocationStore`]
pub struct TokenBlacklist {
    store: Arc<dyn RevocationStore>,
}

impl TokenBlacklist {
    pub fn new(store: Arc<dyn RevocationStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRevocationStore::new()))
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Store key for a token; the raw token is never persisted
    pub fn token_key(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        format!("{}{}", TOKEN_KEY_PREFIX, hex::encode(digest))
    }

    pub fn user_key(user_id: i64) -> String {
        format!("{}user:{}", TOKEN_KEY_PREFIX, user_id)
    }

    /// Blacklist a single token for `expires_in`. Returns false if the store rejected the write.
    pub async fn blacklist(&self, token: &str, expires_in: Duration) -> bool {
        let key = Self::token_key(token);
        match self.store.put(&key, Utc::now().timestamp_millis(), expires_in).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to blacklist token: {}", e);
                false
            }
        }
    }

    pub async fn is_blacklisted(&self, token: &str) -> bool {
        let key = Self::token_key(token);
        match self.store.get(&key).await {
            Ok(entry) => entry.is_some(),
            Err(e) => {
                log::error!("Failed to check token blacklist: {}", e);
                false
            }
        }
    }

    /// Revoke every token issued to the user up to now (logout from all devices)
    pub async fn blacklist_user(&self, user_id: i64, expires_in: Duration) -> bool {
        let key = Self::user_key(user_id);
        match self.store.put(&key, Utc::now().timestamp_millis(), expires_in).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to blacklist user {}: {}", user_id, e);
                false
            }
        }
    }

    pub async fn user_revoked_at(&self, user_id: i64) -> Option<i64> {
        let key = Self::user_key(user_id);
        match self.store.get(&key).await {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("Failed to check user blacklist: {}", e);
                None
            }
        }
    }

    /// True when a token issued at `issued_at_ms` predates the user's last logout_all
    pub async fn is_user_revoked(&self, user_id: i64, issued_at_ms: i64) -> bool {
        match self.user_revoked_at(user_id).await {
            Some(revoked_at_ms) => issued_at_ms <= revoked_at_ms,
            None => false,
        }
    }

    pub async fn purge_expired(&self) {
        match self.store.purge_expired().await {
            Ok(0) => {}
            Ok(removed) => log::info!("Revocation cleanup: removed {} expired entries", removed),
            Err(e) => log::warn!("Revocation cleanup failed: {}", e),
        }
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired blacklist entries
pub fn start_cleanup_task(blacklist: Arc<TokenBlacklist>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            blacklist.purge_expired().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose backend is always down
    struct UnreachableStore;

    #[async_trait]
    impl RevocationStore for UnreachableStore {
        async fn put(&self, _: &str, _: i64, _: Duration) -> Result<(), RevocationError> {
            Err(RevocationError::Unavailable("connection refused".to_string()))
        }

        async fn get(&self, _: &str) -> Result<Option<i64>, RevocationError> {
            Err(RevocationError::Unavailable("connection refused".to_string()))
        }

        async fn purge_expired(&self) -> Result<u64, RevocationError> {
            Err(RevocationError::Unavailable("connection refused".to_string()))
        }

        fn backend(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_memory_store_set_get() {
        let store = MemoryRevocationStore::new();
        store.put("key", 123, Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("key").await.unwrap(), Some(123));
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_expiration() {
        let store = MemoryRevocationStore::new();
        store.put("key", 1, Duration::from_millis(50)).await.unwrap();
        assert!(store.get("key").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(store.get("key").await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn test_keys_do_not_contain_raw_token() {
        let key = TokenBlacklist::token_key("header.payload.signature");
        assert!(key.starts_with(TOKEN_KEY_PREFIX));
        assert!(!key.contains("payload"));
        // prefix + 64 hex chars
        assert_eq!(key.len(), TOKEN_KEY_PREFIX.len() + 64);
        assert_eq!(key, TokenBlacklist::token_key("header.payload.signature"));

        assert_eq!(TokenBlacklist::user_key(9), "blacklist:token:user:9");
    }

    #[tokio::test]
    async fn test_blacklist_token() {
        let blacklist = TokenBlacklist::in_memory();
        assert!(!blacklist.is_blacklisted("abc").await);

        assert!(blacklist.blacklist("abc", Duration::from_secs(60)).await);
        assert!(blacklist.is_blacklisted("abc").await);
        assert!(!blacklist.is_blacklisted("abd").await);
    }

    #[tokio::test]
    async fn test_user_revocation_only_affects_older_tokens() {
        let blacklist = TokenBlacklist::in_memory();
        let now_ms = Utc::now().timestamp_millis();
        assert!(!blacklist.is_user_revoked(5, now_ms).await);

        assert!(blacklist.blacklist_user(5, DEFAULT_USER_REVOCATION_TTL).await);

        assert!(blacklist.is_user_revoked(5, now_ms - 60_000).await);
        assert!(blacklist.is_user_revoked(5, now_ms).await);
        assert!(!blacklist.is_user_revoked(5, now_ms + 60_000).await);
        assert!(!blacklist.is_user_revoked(6, now_ms - 60_000).await);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_open() {
        let blacklist = TokenBlacklist::new(Arc::new(UnreachableStore));

        assert!(!blacklist.is_blacklisted("abc").await);
        assert!(!blacklist.is_user_revoked(1, 0).await);
        assert_eq!(blacklist.user_revoked_at(1).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_store_reports_failed_writes() {
        let blacklist = TokenBlacklist::new(Arc::new(UnreachableStore));

        assert!(!blacklist.blacklist("abc", Duration::from_secs(60)).await);
        assert!(!blacklist.blacklist_user(1, DEFAULT_USER_REVOCATION_TTL).await);
        // Must not panic
        blacklist.purge_expired().await;
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_pg_store_keeps_latest_revocation(pool: PgPool) {
        let store = PgRevocationStore::new(pool.clone());
        store.put("user:1", 2_000, Duration::from_secs(3600)).await.unwrap();

        // An older write must not move the marker backwards or shorten its life
        store.put("user:1", 1_000, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("user:1").await.unwrap(), Some(2_000));

        let (remaining,): (i64,) = sqlx::query_as(
            "SELECT EXTRACT(EPOCH FROM expires_at - NOW())::BIGINT FROM revoked_tokens WHERE key = $1",
        )
        .bind("user:1")
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(remaining > 3500);

        store.put("user:1", 3_000, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("user:1").await.unwrap(), Some(3_000));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_pg_store_hides_expired_rows(pool: PgPool) {
        sqlx::query(
            "INSERT INTO revoked_tokens (key, revoked_at, expires_at) \
             VALUES ('stale', 1, NOW() - INTERVAL '1 second')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let store = PgRevocationStore::new(pool);
        store.put("fresh", 2, Duration::from_secs(60)).await.unwrap();

        // Expired rows are invisible before any purge runs
        assert_eq!(store.get("stale").await.unwrap(), None);
        assert_eq!(store.get("fresh").await.unwrap(), Some(2));

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.get("fresh").await.unwrap(), Some(2));
    }
}
