// src/handlers/auth.rs
// DOCUMENTATION: HTTP handlers for accounts and sessions
// PURPOSE: Parse requests, call AuthService, return responses

use crate::errors::ApiError;
use crate::handlers::extractors::AuthUser;
use crate::models::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, UpdateProfileRequest};
use crate::services::{AuthService, TokenBlacklist, TokenService};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// POST /auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, ApiError> {
    let response = AuthService::register(pool.get_ref(), tokens.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, ApiError> {
    let response = AuthService::login(pool.get_ref(), tokens.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/refresh
pub async fn refresh(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    blacklist: web::Data<TokenBlacklist>,
    body: web::Json<RefreshRequest>,
) -> Result<impl Responder, ApiError> {
    let pair = AuthService::refresh(
        pool.get_ref(),
        tokens.get_ref(),
        blacklist.get_ref(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "tokens": pair })))
}

/// GET /auth/profile
pub async fn profile(pool: web::Data<PgPool>, auth: AuthUser) -> Result<impl Responder, ApiError> {
    let user = AuthService::profile(pool.get_ref(), auth.user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// PUT /auth/profile
pub async fn update_profile(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, ApiError> {
    let user = AuthService::update_profile(pool.get_ref(), &auth.user, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// POST /auth/logout
/// The body is optional; it may carry the refresh token to revoke as well
pub async fn logout(
    tokens: web::Data<TokenService>,
    blacklist: web::Data<TokenBlacklist>,
    auth: AuthUser,
    body: Option<web::Json<LogoutRequest>>,
) -> Result<impl Responder, ApiError> {
    let req = body.map(web::Json::into_inner).unwrap_or_default();
    AuthService::logout(tokens.get_ref(), blacklist.get_ref(), &auth, req).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully logged out" })))
}

/// POST /auth/logout_all
pub async fn logout_all(
    blacklist: web::Data<TokenBlacklist>,
    auth: AuthUser,
) -> Result<impl Responder, ApiError> {
    AuthService::logout_all(blacklist.get_ref(), auth.user.id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully logged out from all devices"
    })))
}

/// Configuration for auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/profile", web::get().to(profile))
            .route("/profile", web::put().to(update_profile))
            .route("/logout", web::post().to(logout))
            .route("/logout_all", web::post().to(logout_all)),
    );
}
