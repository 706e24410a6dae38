// src/handlers/extractors.rs
// DOCUMENTATION: Request extractors for bearer-token authentication
// PURPOSE: Resolve the current user before a handler runs
//
// AuthUser      - rejects the request with 401 unless the token checks out
// OptionalUser  - anonymous viewer on any token problem

use crate::errors::ApiError;
use crate::models::User;
use crate::services::{AuthService, Session, TokenBlacklist, TokenService};
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use sqlx::PgPool;
use std::ops::Deref;

/// Authenticated user for the current request
#[derive(Debug, Clone)]
pub struct AuthUser(pub Session);

impl Deref for AuthUser {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

/// Signed-in user when a valid access token is present
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl OptionalUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Shared state the auth pipeline needs
struct AuthState {
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    blacklist: web::Data<TokenBlacklist>,
}

impl AuthState {
    fn from_request(req: &HttpRequest) -> Result<Self, ApiError> {
        match (
            req.app_data::<web::Data<PgPool>>(),
            req.app_data::<web::Data<TokenService>>(),
            req.app_data::<web::Data<TokenBlacklist>>(),
        ) {
            (Some(pool), Some(tokens), Some(blacklist)) => Ok(Self {
                pool: pool.clone(),
                tokens: tokens.clone(),
                blacklist: blacklist.clone(),
            }),
            _ => {
                log::error!("Authentication state is not registered on the app");
                Err(ApiError::InternalError("Internal server error".to_string()))
            }
        }
    }

    async fn authenticate(&self, authorization: Option<&str>) -> Result<Session, ApiError> {
        AuthService::authenticate(
            self.pool.get_ref(),
            self.tokens.get_ref(),
            self.blacklist.get_ref(),
            authorization,
        )
        .await
    }
}

fn authorization_header(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = AuthState::from_request(req);
        let authorization = authorization_header(req);
        let path = req.path().to_string();

        Box::pin(async move {
            let session = state?.authenticate(authorization.as_deref()).await.map_err(|e| {
                if let ApiError::Unauthorized(reason) = &e {
                    log::warn!("Rejected request to {}: {}", path, reason);
                }
                e
            })?;
            Ok(AuthUser(session))
        })
    }
}

impl FromRequest for OptionalUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = AuthState::from_request(req);
        let authorization = authorization_header(req);

        Box::pin(async move {
            if authorization.is_none() {
                return Ok(OptionalUser(None));
            }

            match state?.authenticate(authorization.as_deref()).await {
                Ok(session) => Ok(OptionalUser(Some(session.user))),
                Err(ApiError::Unauthorized(reason)) => {
                    log::debug!("Ignoring unusable token on public route: {}", reason);
                    Ok(OptionalUser(None))
                }
                Err(other) => Err(other),
            }
        })
    }
}
