// src/lib.rs
// DOCUMENTATION: Library root shared by the API server and the import tool

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
