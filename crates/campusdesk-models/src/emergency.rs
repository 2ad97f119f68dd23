use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "emergency_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmergencyStatus {
    Reported,
    Responded,
    Resolved,
    Cancelled,
}

impl EmergencyStatus {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Responder {
    pub id: Uuid,
    pub alert_id: Uuid,
    pub responder_id: Uuid,
    pub responder_contact: String,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EmergencyAlert {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub emergency_type: String,
    pub description: String,
    pub status: EmergencyStatus,
    pub reported_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub responders: Vec<Responder>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmergencyAlertDto {
    #[validate(length(min = 1, message = "emergency_type is required"))]
    pub emergency_type: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmergencyStatusDto {
    pub status: EmergencyStatus,
    pub responder_contact: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmergencyFilter {
    pub status: Option<EmergencyStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_statuses() {
        assert!(EmergencyStatus::Resolved.is_closed());
        assert!(EmergencyStatus::Cancelled.is_closed());
        assert!(!EmergencyStatus::Reported.is_closed());
        assert!(!EmergencyStatus::Responded.is_closed());
    }

    #[test]
    fn test_coordinates_are_range_checked() {
        let dto = CreateEmergencyAlertDto {
            emergency_type: "medical".to_string(),
            description: "Fainted near the gym".to_string(),
            latitude: Some(120.0),
            longitude: Some(10.0),
            address: None,
        };
        assert!(dto.validate().is_err());
    }
}
