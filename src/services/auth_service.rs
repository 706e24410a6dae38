// src/services/auth_service.rs
// DOCUMENTATION: Account and session business logic
// PURPOSE: Registration, login, token refresh, profile and logout flows,
// plus the bearer-token checks shared by the auth extractors
//
// Access token checks run in a fixed order:
//   1. missing token            -> "Missing authorization token"
//   2. token blacklisted        -> "Token has been revoked"
//   3. decode as access token   -> decode error message
//   4. user-level revocation    -> "All sessions have been revoked"
//   5. user row missing         -> "User not found"

use crate::db::UserRepository;
use crate::errors::{validation_details, ApiError};
use crate::models::{
    AuthResponse, Claims, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, TokenPair,
    TokenType, UpdateProfileRequest, User, UserProfile, UserResponse, UserRole,
};
use crate::services::password::{hash_password, verify_password};
use crate::services::revocation::{TokenBlacklist, DEFAULT_USER_REVOCATION_TTL};
use crate::services::token_service::TokenService;
use sqlx::PgPool;
use std::time::Duration;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const LOGOUT_FAILED: &str = "Logout failed. Please try again.";

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let rest = header?.strip_prefix("Bearer")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

/// Checks 1-4 of the access token pipeline; no database access
pub async fn verify_access_token(
    tokens: &TokenService,
    blacklist: &TokenBlacklist,
    token: Option<&str>,
) -> Result<Claims, ApiError> {
    let token = token.ok_or_else(|| ApiError::unauthorized("Missing authorization token"))?;

    if blacklist.is_blacklisted(token).await {
        return Err(ApiError::unauthorized("Token has been revoked"));
    }

    let claims = tokens.decode(token, TokenType::Access)?;

    if blacklist.is_user_revoked(claims.user_id, claims.iat_ms).await {
        return Err(ApiError::unauthorized("All sessions have been revoked"));
    }

    Ok(claims)
}

/// An authenticated request: the user, its token claims and the raw token
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub claims: Claims,
    pub token: String,
}

pub struct AuthService;

impl AuthService {
    /// Full access token pipeline including the user lookup
    pub async fn authenticate(
        pool: &PgPool,
        tokens: &TokenService,
        blacklist: &TokenBlacklist,
        authorization: Option<&str>,
    ) -> Result<Session, ApiError> {
        let token = bearer_token(authorization);
        let claims = verify_access_token(tokens, blacklist, token).await?;

        let user = UserRepository::find_by_id(pool, claims.user_id)
            .await?
            .ok_or_else(|| {
                log::warn!("Token for missing user {}", claims.user_id);
                ApiError::unauthorized("User not found")
            })?;

        Ok(Session {
            user,
            claims,
            token: token.unwrap_or_default().to_string(),
        })
    }

    /// Create an account and sign the user in
    pub async fn register(
        pool: &PgPool,
        tokens: &TokenService,
        req: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let mut details = match req.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => validation_details(&errors),
        };

        if let (Some(password), Some(confirmation)) = (&req.password, &req.password_confirmation) {
            if password != confirmation {
                details.push("Password confirmation doesn't match Password".to_string());
            }
        }

        // Uniqueness needs the database; only ask once the input is well formed
        if details.is_empty() {
            if let Some(email) = req.email.as_deref() {
                if UserRepository::email_taken(pool, email, None).await? {
                    details.push("Email has already been taken".to_string());
                }
            }
            if let Some(username) = req.username.as_deref() {
                if UserRepository::username_taken(pool, username, None).await? {
                    details.push("Username has already been taken".to_string());
                }
            }
        }

        if !details.is_empty() {
            details.sort();
            log::info!("Registration rejected: {:?}", details);
            return Err(ApiError::unprocessable("Registration failed", details));
        }

        let username = req.username.unwrap_or_default();
        let email = req.email.unwrap_or_default().to_lowercase();
        let digest = hash_password(req.password.unwrap_or_default()).await?;

        let user = UserRepository::create_user(pool, &username, &email, &digest, UserRole::Member)
            .await
            .map_err(|e| e.with_message("Registration failed"))?;

        let tokens = tokens.generate_tokens(user.id)?;
        let profile = UserProfile {
            user,
            photo_count: 0,
            favorite_count: 0,
        };

        Ok(AuthResponse {
            user: profile.to_response(),
            tokens,
        })
    }

    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        req: LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let (email, password) = match (req.email, req.password) {
            (Some(email), Some(password)) if !email.is_empty() => (email, password),
            _ => return Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
        };

        let user = match UserRepository::find_by_email(pool, &email.to_lowercase()).await? {
            Some(user) => user,
            None => {
                log::warn!("Login attempt for unknown email");
                return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        if !verify_password(password, user.password_digest.clone()).await? {
            log::warn!("Failed login for user {}", user.id);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        let profile = UserRepository::get_profile(pool, user.id).await?;
        log::info!("User {} logged in", user.id);

        Ok(AuthResponse {
            user: profile.to_response(),
            tokens: tokens.generate_tokens(user.id)?,
        })
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh(
        pool: &PgPool,
        tokens: &TokenService,
        blacklist: &TokenBlacklist,
        req: RefreshRequest,
    ) -> Result<TokenPair, ApiError> {
        let token = req
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing refresh token"))?;

        if blacklist.is_blacklisted(&token).await {
            return Err(ApiError::unauthorized("Token has been revoked"));
        }

        let claims = tokens.decode(&token, TokenType::Refresh)?;

        if blacklist.is_user_revoked(claims.user_id, claims.iat_ms).await {
            return Err(ApiError::unauthorized("All sessions have been revoked"));
        }

        let user = UserRepository::find_by_id(pool, claims.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        Ok(tokens.generate_tokens(user.id)?)
    }

    pub async fn profile(pool: &PgPool, user_id: i64) -> Result<UserResponse, ApiError> {
        Ok(UserRepository::get_profile(pool, user_id).await?.to_response())
    }

    pub async fn update_profile(
        pool: &PgPool,
        user: &User,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, ApiError> {
        let mut details = match req.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => validation_details(&errors),
        };

        if details.is_empty() {
            if let Some(username) = req.username.as_deref() {
                if UserRepository::username_taken(pool, username, Some(user.id)).await? {
                    details.push("Username has already been taken".to_string());
                }
            }
        }

        if !details.is_empty() {
            return Err(ApiError::unprocessable("Update failed", details));
        }

        UserRepository::update_profile(pool, user.id, &req)
            .await
            .map_err(|e| e.with_message("Update failed"))?;

        Self::profile(pool, user.id).await
    }

    /// Revoke the current access token for the rest of its lifetime
    /// A refresh token in the body is revoked too, if it belongs to the same user
    pub async fn logout(
        tokens: &TokenService,
        blacklist: &TokenBlacklist,
        session: &Session,
        req: LogoutRequest,
    ) -> Result<(), ApiError> {
        let ttl = TokenService::remaining_ttl_secs(&session.claims);
        if !blacklist.blacklist(&session.token, ttl_duration(ttl)).await {
            return Err(ApiError::InternalError(LOGOUT_FAILED.to_string()));
        }

        if let Some(refresh_token) = req.refresh_token.filter(|t| !t.is_empty()) {
            match tokens.decode(&refresh_token, TokenType::Refresh) {
                Ok(claims) if claims.user_id == session.claims.user_id => {
                    let ttl = TokenService::remaining_ttl_secs(&claims);
                    if !blacklist.blacklist(&refresh_token, ttl_duration(ttl)).await {
                        log::warn!("Refresh token for user {} was not revoked", claims.user_id);
                    }
                }
                Ok(_) => log::warn!("Ignoring refresh token of another user on logout"),
                Err(e) => log::debug!("Ignoring unusable refresh token on logout: {}", e),
            }
        }

        log::info!("User {} logged out", session.user.id);
        Ok(())
    }

    /// Revoke every token issued to the user so far
    pub async fn logout_all(blacklist: &TokenBlacklist, user_id: i64) -> Result<(), ApiError> {
        if !blacklist.blacklist_user(user_id, DEFAULT_USER_REVOCATION_TTL).await {
            return Err(ApiError::InternalError(LOGOUT_FAILED.to_string()));
        }

        log::info!("User {} logged out from all devices", user_id);
        Ok(())
    }
}

fn ttl_duration(secs: i64) -> Duration {
    Duration::from_secs(secs.max(1).unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::revocation::{RevocationError, RevocationStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn tokens() -> TokenService {
        TokenService::new("auth-test-secret", 900, 604_800)
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgresql://nobody@localhost:1/none")
            .unwrap()
    }

    fn session(tokens: &TokenService, user_id: i64) -> Session {
        let token = tokens.encode_access_token(user_id).unwrap();
        let claims = tokens.decode(&token, TokenType::Access).unwrap();
        Session {
            user: User {
                id: user_id,
                username: "tester".to_string(),
                email: "tester@example.com".to_string(),
                password_digest: String::new(),
                bio: None,
                avatar_url: None,
                role: UserRole::Member,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            claims,
            token,
        }
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl RevocationStore for ReadOnlyStore {
        async fn put(&self, _: &str, _: i64, _: Duration) -> Result<(), RevocationError> {
            Err(RevocationError::Unavailable("read only".to_string()))
        }

        async fn get(&self, _: &str) -> Result<Option<i64>, RevocationError> {
            Ok(None)
        }

        async fn purge_expired(&self) -> Result<u64, RevocationError> {
            Ok(0)
        }

        fn backend(&self) -> &'static str {
            "read-only"
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("Bearer    abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Bearerabc")), None);
        assert_eq!(bearer_token(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let err = verify_access_token(&tokens(), &TokenBlacklist::in_memory(), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing authorization token");
    }

    #[tokio::test]
    async fn test_valid_access_token() {
        let tokens = tokens();
        let token = tokens.encode_access_token(3).unwrap();
        let claims = verify_access_token(&tokens, &TokenBlacklist::in_memory(), Some(&token))
            .await
            .unwrap();
        assert_eq!(claims.user_id, 3);
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_access() {
        let tokens = tokens();
        let token = tokens.encode_refresh_token(3).unwrap();
        let err = verify_access_token(&tokens, &TokenBlacklist::in_memory(), Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid token type: expected access");
    }

    #[tokio::test]
    async fn test_blacklist_checked_before_decoding() {
        let blacklist = TokenBlacklist::in_memory();
        blacklist.blacklist("garbage", Duration::from_secs(60)).await;

        let err = verify_access_token(&tokens(), &blacklist, Some("garbage"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Token has been revoked");
    }

    #[tokio::test]
    async fn test_logout_revokes_current_token() {
        let tokens = tokens();
        let blacklist = TokenBlacklist::in_memory();
        let session = session(&tokens, 4);

        AuthService::logout(&tokens, &blacklist, &session, LogoutRequest::default())
            .await
            .unwrap();

        let err = verify_access_token(&tokens, &blacklist, Some(&session.token))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Token has been revoked");
    }

    #[tokio::test]
    async fn test_logout_also_revokes_own_refresh_token() {
        let tokens = tokens();
        let blacklist = TokenBlacklist::in_memory();
        let session = session(&tokens, 4);
        let own_refresh = tokens.encode_refresh_token(4).unwrap();
        let foreign_refresh = tokens.encode_refresh_token(5).unwrap();

        AuthService::logout(
            &tokens,
            &blacklist,
            &session,
            LogoutRequest {
                refresh_token: Some(own_refresh.clone()),
            },
        )
        .await
        .unwrap();
        assert!(blacklist.is_blacklisted(&own_refresh).await);

        let other = self::session(&tokens, 4);
        AuthService::logout(
            &tokens,
            &blacklist,
            &other,
            LogoutRequest {
                refresh_token: Some(foreign_refresh.clone()),
            },
        )
        .await
        .unwrap();
        assert!(!blacklist.is_blacklisted(&foreign_refresh).await);
    }

    #[tokio::test]
    async fn test_logout_reports_store_failure() {
        let tokens = tokens();
        let blacklist = TokenBlacklist::new(Arc::new(ReadOnlyStore));
        let session = session(&tokens, 4);

        let err = AuthService::logout(&tokens, &blacklist, &session, LogoutRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Logout failed. Please try again.");

        let err = AuthService::logout_all(&blacklist, 4).await.unwrap_err();
        assert_eq!(err.to_string(), "Logout failed. Please try again.");
    }

    #[tokio::test]
    async fn test_logout_all_revokes_existing_tokens() {
        let tokens = tokens();
        let blacklist = TokenBlacklist::in_memory();
        let now = Utc::now().timestamp();
        // Issued before the logout
        let old_token = tokens
            .encode(&Claims {
                user_id: 8,
                token_type: TokenType::Access,
                iat: now - 30,
                iat_ms: (now - 30) * 1000,
                exp: now + 870,
            })
            .unwrap();

        AuthService::logout_all(&blacklist, 8).await.unwrap();

        let err = verify_access_token(&tokens, &blacklist, Some(&old_token))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "All sessions have been revoked");
    }

    #[tokio::test]
    async fn test_tokens_issued_after_logout_all_are_accepted() {
        let tokens = tokens();
        let blacklist = TokenBlacklist::in_memory();

        AuthService::logout_all(&blacklist, 9).await.unwrap();
        // Next millisecond: a new login within the same wall-clock second
        tokio::time::sleep(Duration::from_millis(2)).await;
        let pair = tokens.generate_tokens(9).unwrap();

        let claims = verify_access_token(&tokens, &blacklist, Some(&pair.access_token))
            .await
            .unwrap();
        assert_eq!(claims.user_id, 9);

        let refresh = tokens.decode(&pair.refresh_token, TokenType::Refresh).unwrap();
        assert!(!blacklist.is_user_revoked(9, refresh.iat_ms).await);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_and_revoked_tokens() {
        let tokens = tokens();
        let blacklist = TokenBlacklist::in_memory();
        let pool = lazy_pool();

        let err = AuthService::refresh(&pool, &tokens, &blacklist, RefreshRequest { refresh_token: None })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing refresh token");

        let access = tokens.encode_access_token(1).unwrap();
        let err = AuthService::refresh(
            &pool,
            &tokens,
            &blacklist,
            RefreshRequest {
                refresh_token: Some(access),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid token type: expected refresh");

        let refresh = tokens.encode_refresh_token(1).unwrap();
        blacklist.blacklist(&refresh, Duration::from_secs(60)).await;
        let err = AuthService::refresh(
            &pool,
            &tokens,
            &blacklist,
            RefreshRequest {
                refresh_token: Some(refresh),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Token has been revoked");
    }

    #[tokio::test]
    async fn test_register_validation_runs_before_database() {
        let req = RegisterRequest {
            username: Some("new_user".to_string()),
            email: Some("new@example.com".to_string()),
            password: Some("password123".to_string()),
            password_confirmation: Some("password124".to_string()),
        };

        match AuthService::register(&lazy_pool(), &tokens(), req).await {
            Err(ApiError::Unprocessable { message, details }) => {
                assert_eq!(message, "Registration failed");
                assert_eq!(
                    details,
                    vec!["Password confirmation doesn't match Password".to_string()]
                );
            }
            other => panic!("expected 422, got {:?}", other.map(|r| r.user.id)),
        }
    }

    #[tokio::test]
    async fn test_login_without_credentials() {
        let req = LoginRequest {
            email: None,
            password: Some("password123".to_string()),
        };
        let err = AuthService::login(&lazy_pool(), &tokens(), req)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
    }
}
