// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod album_repository;
pub mod favorite_repository;
pub mod photo_repository;
pub mod photographer_repository;
pub mod user_repository;

pub use album_repository::*;
pub use favorite_repository::*;
pub use photo_repository::*;
pub use photographer_repository::*;
pub use user_repository::*;
