// src/models/photo.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::timestamps::iso8601;
use super::{PaginationMeta, PhotographerResponse, User, UserSummary};

/// Photo record joined with its photographer name and creator username
#[derive(Debug, Clone, FromRow)]
pub struct Photo {
    pub id: i64,
    pub pexels_id: Option<i32>,
    pub width: i32,
    pub height: i32,
    pub url: String,
    pub avg_color: Option<String>,
    pub alt: Option<String>,
    pub src_original: Option<String>,
    pub src_large2x: Option<String>,
    pub src_large: Option<String>,
    pub src_medium: Option<String>,
    pub src_small: Option<String>,
    pub src_portrait: Option<String>,
    pub src_landscape: Option<String>,
    pub src_tiny: Option<String>,
    pub photographer_id: i64,
    pub photographer_name: String,
    pub created_by_id: Option<i64>,
    pub created_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn from_dimensions(width: i32, height: i32) -> Self {
        if width > height {
            Orientation::Landscape
        } else if height > width {
            Orientation::Portrait
        } else {
            Orientation::Square
        }
    }

    /// Unknown values are ignored by the list filter
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "landscape" => Some(Orientation::Landscape),
            "portrait" => Some(Orientation::Portrait),
            "square" => Some(Orientation::Square),
            _ => None,
        }
    }
}

/// Reduced width:height ratio, e.g. 1920x1080 => "16:9"
pub fn aspect_ratio(width: i32, height: i32) -> String {
    if width == height {
        return "1:1".to_string();
    }
    let divisor = gcd(width.unsigned_abs(), height.unsigned_abs()).max(1);
    format!(
        "{}:{}",
        width.unsigned_abs() / divisor,
        height.unsigned_abs() / divisor
    )
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// `{id, name}` photographer reference used in compact views
#[derive(Debug, Clone, Serialize)]
pub struct PhotographerSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompactSources {
    pub medium: Option<String>,
    pub small: Option<String>,
    pub tiny: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullSources {
    pub original: Option<String>,
    pub large2x: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
    pub portrait: Option<String>,
    pub landscape: Option<String>,
    pub tiny: Option<String>,
}

/// Photo DTO for list responses
#[derive(Debug, Clone, Serialize)]
pub struct PhotoResponse {
    pub id: i64,
    pub pexels_id: Option<i32>,
    pub width: i32,
    pub height: i32,
    pub url: String,
    pub alt: Option<String>,
    pub avg_color: Option<String>,
    pub orientation: Orientation,
    pub photographer: PhotographerSummary,
    pub src: CompactSources,
    pub is_favorited: bool,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

/// Photo DTO for GET /photos/{id}, create and update
#[derive(Debug, Clone, Serialize)]
pub struct PhotoDetailResponse {
    pub id: i64,
    pub pexels_id: Option<i32>,
    pub width: i32,
    pub height: i32,
    pub url: String,
    pub alt: Option<String>,
    pub avg_color: Option<String>,
    pub orientation: Orientation,
    pub aspect_ratio: String,
    pub photographer: PhotographerResponse,
    pub src: FullSources,
    pub is_favorited: bool,
    pub created_by: Option<UserSummary>,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "iso8601")]
    pub updated_at: DateTime<Utc>,
}

impl Photo {
    /// Creators and admins may change a photo
    pub fn is_editable_by(&self, user: &User) -> bool {
        user.is_admin() || self.created_by_id == Some(user.id)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_dimensions(self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> String {
        aspect_ratio(self.width, self.height)
    }

    /// Convert into the compact list DTO
    pub fn to_response(&self, is_favorited: bool) -> PhotoResponse {
        PhotoResponse {
            id: self.id,
            pexels_id: self.pexels_id,
            width: self.width,
            height: self.height,
            url: self.url.clone(),
            alt: self.alt.clone(),
            avg_color: self.avg_color.clone(),
            orientation: self.orientation(),
            photographer: PhotographerSummary {
                id: self.photographer_id,
                name: self.photographer_name.clone(),
            },
            src: CompactSources {
                medium: self.src_medium.clone(),
                small: self.src_small.clone(),
                tiny: self.src_tiny.clone(),
            },
            is_favorited,
            created_at: self.created_at,
        }
    }

    /// Convert into the detailed DTO; the caller supplies the loaded photographer
    pub fn to_detail_response(
        &self,
        photographer: PhotographerResponse,
        is_favorited: bool,
    ) -> PhotoDetailResponse {
        let created_by = match (self.created_by_id, &self.created_by_username) {
            (Some(id), Some(username)) => Some(UserSummary {
                id,
                username: username.clone(),
            }),
            _ => None,
        };

        PhotoDetailResponse {
            id: self.id,
            pexels_id: self.pexels_id,
            width: self.width,
            height: self.height,
            url: self.url.clone(),
            alt: self.alt.clone(),
            avg_color: self.avg_color.clone(),
            orientation: self.orientation(),
            aspect_ratio: self.aspect_ratio(),
            photographer,
            src: FullSources {
                original: self.src_original.clone(),
                large2x: self.src_large2x.clone(),
                large: self.src_large.clone(),
                medium: self.src_medium.clone(),
                small: self.src_small.clone(),
                portrait: self.src_portrait.clone(),
                landscape: self.src_landscape.clone(),
                tiny: self.src_tiny.clone(),
            },
            is_favorited,
            created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// GET /photos response
#[derive(Debug, Clone, Serialize)]
pub struct PhotoListResponse {
    pub photos: Vec<PhotoResponse>,
    pub meta: PaginationMeta,
}

/// Request to create a new photo
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePhotoRequest {
    #[validate(
        required(message = "can't be blank"),
        range(min = 1, message = "must be greater than 0")
    )]
    pub width: Option<i32>,

    #[validate(
        required(message = "can't be blank"),
        range(min = 1, message = "must be greater than 0")
    )]
    pub height: Option<i32>,

    #[validate(
        required(message = "can't be blank"),
        length(min = 1, message = "can't be blank")
    )]
    pub url: Option<String>,

    pub alt: Option<String>,

    #[validate(custom = "validate_hex_color")]
    pub avg_color: Option<String>,

    pub pexels_id: Option<i32>,

    #[validate(required(message = "must exist"))]
    pub photographer_id: Option<i64>,

    pub src_original: Option<String>,
    pub src_large2x: Option<String>,
    pub src_large: Option<String>,
    pub src_medium: Option<String>,
    pub src_small: Option<String>,
    pub src_portrait: Option<String>,
    pub src_landscape: Option<String>,
    pub src_tiny: Option<String>,
}

/// Request to update a photo; only provided fields change
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePhotoRequest {
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub width: Option<i32>,

    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub height: Option<i32>,

    #[validate(length(min = 1, message = "can't be blank"))]
    pub url: Option<String>,

    pub alt: Option<String>,

    #[validate(custom = "validate_hex_color")]
    pub avg_color: Option<String>,

    pub pexels_id: Option<i32>,

    pub photographer_id: Option<i64>,

    pub src_original: Option<String>,
    pub src_large2x: Option<String>,
    pub src_large: Option<String>,
    pub src_medium: Option<String>,
    pub src_small: Option<String>,
    pub src_portrait: Option<String>,
    pub src_landscape: Option<String>,
    pub src_tiny: Option<String>,
}

/// GET /photos query string
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PhotoQuery {
    /// Case-insensitive match on alt text
    pub search: Option<String>,
    /// landscape | portrait | square
    pub orientation: Option<String>,
    /// Exact avg_color, e.g. "#FF0000"
    pub color: Option<String>,
    pub min_width: Option<i32>,
    pub min_height: Option<i32>,
    /// Case-insensitive match on photographer name
    pub photographer: Option<String>,
    /// created_at | width | height, "-" prefix for descending
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSortField {
    CreatedAt,
    Width,
    Height,
}

impl PhotoSortField {
    pub fn column(&self) -> &'static str {
        match self {
            PhotoSortField::CreatedAt => "p.created_at",
            PhotoSortField::Width => "p.width",
            PhotoSortField::Height => "p.height",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSort {
    pub field: PhotoSortField,
    pub descending: bool,
}

impl PhotoSort {
    /// Parse `?sort=`; defaults to newest first, unknown fields fall back to created_at
    pub fn parse(value: Option<&str>) -> Self {
        let raw = value.unwrap_or("-created_at");
        let (descending, field) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let field = match field {
            "width" => PhotoSortField::Width,
            "height" => PhotoSortField::Height,
            _ => PhotoSortField::CreatedAt,
        };

        PhotoSort { field, descending }
    }

    pub fn order_by(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        // id keeps paging stable across equal sort keys
        format!("{} {}, p.id {}", self.field.column(), direction, direction)
    }
}

/// Blank or `#RRGGBB`
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if color.is_empty() {
        return Ok(());
    }

    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some(Cow::from("must be a valid hex color"));
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::validation_details;
    use crate::models::UserRole;

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            password_digest: String::new(),
            bio: None,
            avatar_url: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn photo(created_by_id: Option<i64>) -> Photo {
        Photo {
            id: 1,
            pexels_id: None,
            width: 1920,
            height: 1080,
            url: "https://example.com/p/1".to_string(),
            avg_color: None,
            alt: None,
            src_original: None,
            src_large2x: None,
            src_large: None,
            src_medium: None,
            src_small: None,
            src_portrait: None,
            src_landscape: None,
            src_tiny: None,
            photographer_id: 1,
            photographer_name: "Jane".to_string(),
            created_by_id,
            created_by_username: created_by_id.map(|id| format!("user{}", id)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_editable_by() {
        let owned = photo(Some(3));
        assert!(owned.is_editable_by(&user(3, UserRole::Member)));
        assert!(owned.is_editable_by(&user(1, UserRole::Admin)));
        assert!(!owned.is_editable_by(&user(4, UserRole::Member)));

        // Imported photos have no creator; only admins may edit them
        let imported = photo(None);
        assert!(!imported.is_editable_by(&user(3, UserRole::Member)));
        assert!(imported.is_editable_by(&user(1, UserRole::Admin)));
    }

    #[test]
    fn test_orientation() {
        assert_eq!(Orientation::from_dimensions(1920, 1080), Orientation::Landscape);
        assert_eq!(Orientation::from_dimensions(1080, 1920), Orientation::Portrait);
        assert_eq!(Orientation::from_dimensions(1080, 1080), Orientation::Square);
        assert_eq!(Orientation::parse("diagonal"), None);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(1920, 1080), "16:9");
        assert_eq!(aspect_ratio(1080, 1080), "1:1");
        assert_eq!(aspect_ratio(4000, 6000), "2:3");
        assert_eq!(aspect_ratio(1001, 1000), "1001:1000");
    }

    #[test]
    fn test_hex_color_validation() {
        assert!(validate_hex_color("#FF00AA").is_ok());
        assert!(validate_hex_color("#ff00aa").is_ok());
        assert!(validate_hex_color("").is_ok());
        assert!(validate_hex_color("not-a-color").is_err());
        assert!(validate_hex_color("#FF00A").is_err());
        assert!(validate_hex_color("FF00AA0").is_err());
    }

    #[test]
    fn test_sort_parsing() {
        let sort = PhotoSort::parse(None);
        assert_eq!(sort.field, PhotoSortField::CreatedAt);
        assert!(sort.descending);

        let sort = PhotoSort::parse(Some("-width"));
        assert_eq!(sort.field, PhotoSortField::Width);
        assert!(sort.descending);
        assert_eq!(sort.order_by(), "p.width DESC, p.id DESC");

        let sort = PhotoSort::parse(Some("height"));
        assert_eq!(sort.field, PhotoSortField::Height);
        assert!(!sort.descending);

        // Anything else must not reach SQL
        let sort = PhotoSort::parse(Some("-id; DROP TABLE photos"));
        assert_eq!(sort.field, PhotoSortField::CreatedAt);
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreatePhotoRequest {
            width: Some(-1),
            ..Default::default()
        };
        let details = validation_details(&req.validate().unwrap_err());
        assert!(details.contains(&"Width must be greater than 0".to_string()));
        assert!(details.contains(&"Height can't be blank".to_string()));
        assert!(details.contains(&"Url can't be blank".to_string()));
        assert!(details.contains(&"Photographer id must exist".to_string()));
    }

    #[test]
    fn test_update_request_checks_color() {
        let req = UpdatePhotoRequest {
            avg_color: Some("red".to_string()),
            ..Default::default()
        };
        let details = validation_details(&req.validate().unwrap_err());
        assert_eq!(details, vec!["Avg color must be a valid hex color".to_string()]);
    }
}
