// src/models/token.rs
// DOCUMENTATION: JWT claim set and the token pair handed to clients

use serde::{Deserialize, Serialize};

use super::UserResponse;

/// Distinguishes short-lived access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Issued-at, unix milliseconds; compared against logout_all markers
    pub iat_ms: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Tokens returned by register/login/refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}

/// Body of register and login responses
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenPair,
}
