// src/handlers/middleware.rs
// DOCUMENTATION: Request correlation and throttling middleware
// PURPOSE: Tag every response with X-Request-ID and enforce the rate limits

use crate::errors::ApiError;
use crate::models::TokenType;
use crate::services::{bearer_token, RequestThrottle, ThrottleRequest, TokenService};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Client-supplied ids are echoed when they are sane header values
fn incoming_request_id(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 255)
        .map(str::to_string)
}

/// Id assigned by [`request_id`]; "-" when that middleware is not installed
fn current_request_id(req: &ServiceRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "-".to_string())
}

/// Echo or generate X-Request-ID, including on error responses
pub async fn request_id(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let id = incoming_request_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));
    let http_req = req.request().clone();

    let mut res = match next.call(req).await {
        Ok(res) => res.map_into_boxed_body(),
        Err(err) => ServiceResponse::from_err(err, http_req),
    };

    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    Ok(res)
}

/// Client address used as the throttle key for anonymous requests
fn client_ip(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// User id from a decodable access token; revocation is not consulted here
fn token_user_id(req: &ServiceRequest) -> Option<i64> {
    let tokens = req.app_data::<web::Data<TokenService>>()?;
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(authorization)?;
    tokens.decode(token, TokenType::Access).ok().map(|c| c.user_id)
}

/// Apply the per-route throttles before the request reaches a handler
pub async fn rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let throttle = req
        .app_data::<web::Data<RequestThrottle>>()
        .filter(|t| t.is_enabled())
        .cloned();

    if let Some(throttle) = throttle {
        let ip = client_ip(&req);
        let verdict = throttle.check(&ThrottleRequest {
            path: req.path(),
            is_post: req.method() == Method::POST,
            ip: &ip,
            user_id: token_user_id(&req),
        });

        if let Err(throttled) = verdict {
            log::warn!(
                "Throttled {} {} ({}, key ip={}): retry in {}s request_id={}",
                req.method(),
                req.path(),
                throttled.rule,
                ip,
                throttled.retry_after_seconds,
                current_request_id(&req)
            );
            return Ok(req.error_response(ApiError::RateLimited {
                retry_after_seconds: throttled.retry_after_seconds,
            }));
        }
    }

    Ok(next.call(req).await?.map_into_boxed_body())
}
