// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod album;
pub mod favorite;
pub mod pagination;
pub mod photo;
pub mod photographer;
pub mod timestamps;
pub mod token;
pub mod user;

pub use album::*;
pub use favorite::*;
pub use pagination::*;
pub use photo::*;
pub use photographer::*;
pub use token::*;
pub use user::*;
