// src/services/import_service.rs
// DOCUMENTATION: Pexels CSV import
// PURPOSE: Load photographers and photos from the Pexels export, idempotently
//
// Process per row (each row in its own transaction):
// 1. Find or create the photographer by Pexels photographer id
// 2. Find or create the photo by Pexels photo id (imported photos have no creator)
// 3. Record failures and keep going

use crate::db::{PhotoRepository, PhotographerRepository, UserRepository};
use crate::errors::{validation_details, ApiError};
use crate::models::{CreatePhotoRequest, UpdateProfileRequest, UserRole};
use crate::services::password::hash_password;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::io;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use validator::Validate;

pub const DEMO_ADMIN_EMAIL: &str = "admin@clever.com";
const DEMO_ADMIN_USERNAME: &str = "admin";
const DEMO_ADMIN_PASSWORD: &str = "password123";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One failed row
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RowError {
    pub pexels_id: Option<String>,
    pub error: String,
}

/// Import statistics
/// DOCUMENTATION: Tracks results of an import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    pub photographers_created: u32,
    pub photographers_found: u32,
    pub photos_created: u32,
    pub photos_found: u32,
    pub errors: Vec<RowError>,
    pub duration_seconds: u64,
}

/// A row of the Pexels export
/// Numeric columns stay textual so one bad cell fails only its own row
#[derive(Debug, Clone, Deserialize)]
pub struct PexelsRow {
    pub id: String,
    pub width: String,
    pub height: String,
    pub url: String,
    pub photographer: String,
    pub photographer_url: Option<String>,
    pub photographer_id: String,
    pub avg_color: Option<String>,
    #[serde(rename = "src.original")]
    pub src_original: Option<String>,
    #[serde(rename = "src.large2x")]
    pub src_large2x: Option<String>,
    #[serde(rename = "src.large")]
    pub src_large: Option<String>,
    #[serde(rename = "src.medium")]
    pub src_medium: Option<String>,
    #[serde(rename = "src.small")]
    pub src_small: Option<String>,
    #[serde(rename = "src.portrait")]
    pub src_portrait: Option<String>,
    #[serde(rename = "src.landscape")]
    pub src_landscape: Option<String>,
    #[serde(rename = "src.tiny")]
    pub src_tiny: Option<String>,
    pub alt: Option<String>,
}

fn parse_int(field: &str, value: &str) -> Result<i32, String> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("{} is not a number: {:?}", field, value))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl PexelsRow {
    pub fn pexels_id(&self) -> Result<i32, String> {
        parse_int("id", &self.id)
    }

    pub fn photographer_pexels_id(&self) -> Result<i32, String> {
        parse_int("photographer_id", &self.photographer_id)
    }

    /// Validated photo insert for this row
    pub fn to_photo_request(&self, photographer_id: i64) -> Result<CreatePhotoRequest, String> {
        let req = CreatePhotoRequest {
            pexels_id: Some(self.pexels_id()?),
            width: Some(parse_int("width", &self.width)?),
            height: Some(parse_int("height", &self.height)?),
            url: Some(self.url.trim().to_string()),
            avg_color: non_blank(&self.avg_color),
            alt: non_blank(&self.alt),
            photographer_id: Some(photographer_id),
            src_original: non_blank(&self.src_original),
            src_large2x: non_blank(&self.src_large2x),
            src_large: non_blank(&self.src_large),
            src_medium: non_blank(&self.src_medium),
            src_small: non_blank(&self.src_small),
            src_portrait: non_blank(&self.src_portrait),
            src_landscape: non_blank(&self.src_landscape),
            src_tiny: non_blank(&self.src_tiny),
        };

        req.validate().map_err(|e| {
            format!("Validation failed: {}", validation_details(&e).join(", "))
        })?;

        Ok(req)
    }
}

pub struct ImportService;

impl ImportService {
    pub async fn import_file(
        pool: &PgPool,
        path: &Path,
        verbose: bool,
    ) -> Result<ImportStats, ImportError> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        log::info!("Importing photos from {}...", path.display());
        let reader = csv::Reader::from_path(path)?;
        Self::import_reader(pool, reader, verbose).await
    }

    pub async fn import_reader<R: io::Read>(
        pool: &PgPool,
        mut reader: csv::Reader<R>,
        verbose: bool,
    ) -> Result<ImportStats, ImportError> {
        let started = Instant::now();
        let mut stats = ImportStats::default();

        for record in reader.deserialize::<PexelsRow>() {
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    log::warn!("Skipping unreadable CSV row: {}", e);
                    stats.errors.push(RowError {
                        pexels_id: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(error) = Self::import_row(pool, &row, &mut stats, verbose).await {
                log::warn!("ERROR importing photo {}: {}", row.id, error);
                stats.errors.push(RowError {
                    pexels_id: Some(row.id.clone()),
                    error,
                });
            }
        }

        stats.duration_seconds = started.elapsed().as_secs();
        log::info!(
            "Import complete: photographers {} created / {} existing, photos {} created / {} existing, {} errors",
            stats.photographers_created,
            stats.photographers_found,
            stats.photos_created,
            stats.photos_found,
            stats.errors.len()
        );

        Ok(stats)
    }

    async fn import_row(
        pool: &PgPool,
        row: &PexelsRow,
        stats: &mut ImportStats,
        verbose: bool,
    ) -> Result<(), String> {
        let photo_pexels_id = row.pexels_id()?;
        let photographer_pexels_id = row.photographer_pexels_id()?;

        let mut tx = pool.begin().await.map_err(|e| e.to_string())?;

        let (photographer_id, created) = PhotographerRepository::find_or_create_by_pexels_id(
            &mut *tx,
            photographer_pexels_id,
            row.photographer.trim(),
            non_blank(&row.photographer_url).as_deref(),
        )
        .await
        .map_err(describe)?;

        let photo_created = match PhotoRepository::find_id_by_pexels_id(&mut *tx, photo_pexels_id)
            .await
            .map_err(describe)?
        {
            Some(_) => false,
            None => {
                let req = row.to_photo_request(photographer_id)?;
                PhotoRepository::create_photo(&mut *tx, &req, None)
                    .await
                    .map_err(describe)?;
                true
            }
        };

        tx.commit().await.map_err(|e| e.to_string())?;

        // Counters only move once the row is committed
        if created {
            stats.photographers_created += 1;
            if verbose {
                log::info!("  Created photographer: {}", row.photographer.trim());
            }
        } else {
            stats.photographers_found += 1;
        }

        if photo_created {
            stats.photos_created += 1;
            if verbose {
                log::info!("  Created photo: {}", photo_pexels_id);
            }
        } else {
            stats.photos_found += 1;
            if verbose {
                log::info!("  Photo {} already exists, skipping", photo_pexels_id);
            }
        }

        Ok(())
    }

    /// Create the demo admin account unless it already exists
    /// Returns true when the account was created
    pub async fn seed_admin(pool: &PgPool) -> Result<bool, ApiError> {
        if UserRepository::email_taken(pool, DEMO_ADMIN_EMAIL, None).await? {
            return Ok(false);
        }

        let digest = hash_password(DEMO_ADMIN_PASSWORD.to_string()).await?;
        let admin = UserRepository::create_user(
            pool,
            DEMO_ADMIN_USERNAME,
            DEMO_ADMIN_EMAIL,
            &digest,
            UserRole::Admin,
        )
        .await?;

        let bio = UpdateProfileRequest {
            bio: Some("Demo admin user".to_string()),
            ..Default::default()
        };
        UserRepository::update_profile(pool, admin.id, &bio).await?;

        log::info!("Created demo admin: {}", DEMO_ADMIN_EMAIL);
        Ok(true)
    }
}

/// Row errors carry the 422 details when there are any
fn describe(err: ApiError) -> String {
    match err {
        ApiError::Unprocessable { message, details } if !details.is_empty() => {
            format!("{}: {}", message, details.join(", "))
        }
        other => other.to_string(),
    }
}
