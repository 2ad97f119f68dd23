use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lost_found_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LostFoundCategory {
    Lost,
    Found,
    Forgot,
}

impl std::str::FromStr for LostFoundCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" => Ok(Self::Lost),
            "found" => Ok(Self::Found),
            "forgot" => Ok(Self::Forgot),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lost_found_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LostFoundStatus {
    Open,
    Claimed,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LostFoundItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: LostFoundCategory,
    pub item_type: String,
    pub image: Option<String>,
    pub location: String,
    pub date_reported: DateTime<Utc>,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub status: LostFoundStatus,
    pub claimed_by: Option<Uuid>,
    pub claimed_by_name: Option<String>,
    pub claim_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLostFoundItem {
    pub title: String,
    pub description: String,
    pub category: LostFoundCategory,
    pub item_type: String,
    pub location: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLostFoundDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    pub status: Option<LostFoundStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LostFoundFilter {
    pub category: Option<LostFoundCategory>,
    pub status: Option<LostFoundStatus>,
}
