// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod album_service;
pub mod auth_service;
pub mod favorite_service;
pub mod import_service;
pub mod password;
pub mod photo_service;
pub mod photographer_service;
pub mod rate_limiter;
pub mod revocation;
pub mod token_service;

pub use album_service::*;
pub use auth_service::*;
pub use favorite_service::*;
pub use import_service::*;
pub use photo_service::*;
pub use photographer_service::*;
pub use rate_limiter::*;
pub use revocation::*;
pub use token_service::*;
