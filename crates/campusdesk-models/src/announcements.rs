use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use campusdesk_core::serde::empty_string_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "announcement_category")]
pub enum AnnouncementCategory {
    Academic,
    Events,
    Administrative,
    Emergency,
}

impl FromStr for AnnouncementCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "academic" => Ok(Self::Academic),
            "events" => Ok(Self::Events),
            "administrative" => Ok(Self::Administrative),
            "emergency" => Ok(Self::Emergency),
            _ => Err(()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "announcement_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub author_id: Uuid,
    pub author_role: String,
    pub author_name: Option<String>,
    pub image: Option<String>,
    pub priority: AnnouncementPriority,
    pub send_email: bool,
    pub send_push: bool,
    pub published_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementDto {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub category: AnnouncementCategory,
    pub priority: Option<AnnouncementPriority>,
    pub image: Option<String>,
    #[serde(default)]
    pub send_email: bool,
    #[serde(default)]
    pub send_push: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub category: Option<AnnouncementCategory>,
    pub priority: Option<AnnouncementPriority>,
    pub image: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AnnouncementFilter {
    pub category: Option<AnnouncementCategory>,
    pub priority: Option<AnnouncementPriority>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub query: Option<String>,
}
