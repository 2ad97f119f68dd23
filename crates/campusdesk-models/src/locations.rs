use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use campusdesk_core::serde::empty_string_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "location_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LocationCategory {
    Classroom,
    Office,
    Lab,
    Mess,
    Library,
    Atm,
    Medical,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CampusLocation {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: LocationCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub image: Option<String>,
    pub facilities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationDto {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub category: LocationCategory,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLocationDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<LocationCategory>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub image: Option<String>,
    pub facilities: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LocationFilter {
    pub category: Option<LocationCategory>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LocationSearch {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(latitude: f64, longitude: f64) -> CreateLocationDto {
        CreateLocationDto {
            name: "Main Library".to_string(),
            description: None,
            category: LocationCategory::Library,
            latitude,
            longitude,
            building: Some("Block A".to_string()),
            floor: None,
            image: None,
            facilities: vec!["wifi".to_string()],
        }
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(location(12.97, 77.59).validate().is_ok());
        assert!(location(90.0, -180.0).validate().is_ok());
        assert!(location(90.5, 0.0).validate().is_err());
        assert!(location(0.0, 181.0).validate().is_err());
    }
}
