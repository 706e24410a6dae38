// src/services/password.rs
// DOCUMENTATION: bcrypt password hashing
// PURPOSE: Keep the CPU-heavy work off the async executor threads

use crate::errors::ApiError;

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
// Minimum cost keeps unit tests fast
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

pub async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| ApiError::InternalError(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            ApiError::InternalError("Failed to hash password".to_string())
        })
}

/// A malformed digest counts as a mismatch
pub async fn verify_password(password: String, digest: String) -> Result<bool, ApiError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &digest))
        .await
        .map_err(|e| ApiError::InternalError(format!("Password check task failed: {}", e)))?;

    Ok(verified.unwrap_or_else(|e| {
        log::warn!("Password digest could not be verified: {}", e);
        false
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let digest = assert_ok!(hash_password("password123".to_string()).await);
        assert_ne!(digest, "password123");

        assert!(verify_password("password123".to_string(), digest.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrong".to_string(), digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_digest_is_a_mismatch() {
        let verified = verify_password("password123".to_string(), "not-a-hash".to_string())
            .await
            .unwrap();
        assert!(!verified);
    }
}
