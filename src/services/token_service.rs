// src/services/token_service.rs
// DOCUMENTATION: JWT encoding/decoding for authentication
// PURPOSE: Issue typed, expiring HS256 tokens and validate them
//
// Token structure:
//   - access token:  15 min TTL, type "access"
//   - refresh token: 7 day TTL,  type "refresh"

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{Claims, TokenPair, TokenType};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("{0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Encoding(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid(_) => ApiError::Unauthorized(err.to_string()),
            TokenError::Encoding(_) => {
                log::error!("{}", err);
                ApiError::InternalError("Failed to issue tokens".to_string())
            }
        }
    }
}

/// Signs and verifies JWTs with a shared HMAC secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock-skew grace period
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )
    }

    pub fn encode_access_token(&self, user_id: i64) -> Result<String, TokenError> {
        self.encode_typed(user_id, TokenType::Access, self.access_ttl_secs)
    }

    pub fn encode_refresh_token(&self, user_id: i64) -> Result<String, TokenError> {
        self.encode_typed(user_id, TokenType::Refresh, self.refresh_ttl_secs)
    }

    /// Generate both tokens for a user
    pub fn generate_tokens(&self, user_id: i64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.encode_access_token(user_id)?,
            refresh_token: self.encode_refresh_token(user_id)?,
            expires_in: self.access_ttl_secs,
            token_type: "Bearer".to_string(),
        })
    }

    /// Decode and validate a token, requiring the given type
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(format!("Invalid token: {}", e)),
            }
        })?;

        if data.claims.token_type != expected {
            return Err(TokenError::Invalid(format!(
                "Invalid token type: expected {}",
                expected.as_str()
            )));
        }

        Ok(data.claims)
    }

    /// Seconds until the token expires, never less than 1
    pub fn remaining_ttl_secs(claims: &Claims) -> i64 {
        (claims.exp - Utc::now().timestamp()).max(1)
    }

    fn encode_typed(
        &self,
        user_id: i64,
        token_type: TokenType,
        ttl_secs: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        self.encode(&Claims {
            user_id,
            token_type,
            iat: now.timestamp(),
            iat_ms: now.timestamp_millis(),
            exp: now.timestamp() + ttl_secs,
        })
    }

    pub(crate) fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-key-12345", 900, 604_800)
    }

    #[test]
    fn test_access_token_round_trip() {
        let tokens = service();
        let token = tokens.encode_access_token(42).unwrap();
        let claims = tokens.decode(&token, TokenType::Access).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.iat_ms / 1000, claims.iat);
    }

    #[test]
    fn test_generate_tokens() {
        let pair = service().generate_tokens(7).unwrap();
        assert_eq!(pair.expires_in, 900);
        assert_eq!(pair.token_type, "Bearer");
        assert_ne!(pair.access_token, pair.refresh_token);

        let claims = service()
            .decode(&pair.refresh_token, TokenType::Refresh)
            .unwrap();
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let tokens = service();
        let access = tokens.encode_access_token(1).unwrap();
        let refresh = tokens.encode_refresh_token(1).unwrap();

        assert_eq!(
            tokens.decode(&access, TokenType::Refresh),
            Err(TokenError::Invalid(
                "Invalid token type: expected refresh".to_string()
            ))
        );
        assert_eq!(
            tokens.decode(&refresh, TokenType::Access),
            Err(TokenError::Invalid(
                "Invalid token type: expected access".to_string()
            ))
        );
    }

    #[test]
    fn test_expired_token() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens
            .encode(&Claims {
                user_id: 1,
                token_type: TokenType::Access,
                iat: now - 1000,
                iat_ms: (now - 1000) * 1000,
                exp: now - 10,
            })
            .unwrap();

        assert_eq!(
            tokens.decode(&token, TokenType::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_different_secrets_reject() {
        let issuer = TokenService::new("secret1", 900, 604_800);
        let verifier = TokenService::new("secret2", 900, 604_800);
        let token = issuer.encode_access_token(1).unwrap();

        match verifier.decode(&token, TokenType::Access) {
            Err(TokenError::Invalid(msg)) => assert!(msg.starts_with("Invalid token:")),
            other => panic!("expected invalid token, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service().decode("invalid.token.here", TokenType::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_remaining_ttl_has_floor() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            token_type: TokenType::Access,
            iat: now - 900,
            iat_ms: (now - 900) * 1000,
            exp: now - 5,
        };
        assert_eq!(TokenService::remaining_ttl_secs(&claims), 1);

        let claims = Claims { exp: now + 600, ..claims };
        let ttl = TokenService::remaining_ttl_secs(&claims);
        assert!(ttl > 590 && ttl <= 600);
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        let err: ApiError = TokenError::Expired.into();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Token has expired"));
    }
}
