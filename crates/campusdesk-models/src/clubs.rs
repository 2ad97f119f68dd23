use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use campusdesk_core::serde::empty_string_as_none;

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "membership_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub advisor_id: Option<Uuid>,
    pub advisor_name: Option<String>,
    pub advisor_email: Option<String>,
    pub leader_id: Option<Uuid>,
    pub leader_name: Option<String>,
    pub leader_email: Option<String>,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClubMember {
    pub student_id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClubAnnouncement {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GalleryImage {
    pub id: Uuid,
    pub club_id: Uuid,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: Club,
    pub members: Vec<ClubMember>,
    pub announcements: Vec<ClubAnnouncement>,
    pub gallery: Vec<GalleryImage>,
    pub events: Vec<Event>,
}

/// `advisor` and `leader` accept either an account id or an email address.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClubDto {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "advisor is required"))]
    pub advisor: String,
    #[validate(length(min = 1, message = "leader is required"))]
    pub leader: String,
    pub logo: Option<String>,
    pub banner: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClubDto {
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub logo: Option<String>,
    pub banner: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClubAnnouncementDto {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClubEventDto {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
    pub domain: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ClubFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
}

/// A club account reference given either as a UUID or as an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
    Id(Uuid),
    Email(String),
}

impl AccountLookup {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match Uuid::parse_str(raw) {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Email(raw.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_lookup_parses_uuid_or_email() {
        let id = Uuid::new_v4();
        assert_eq!(AccountLookup::parse(&id.to_string()), AccountLookup::Id(id));
        assert_eq!(
            AccountLookup::parse(" Lead@Campus.edu "),
            AccountLookup::Email("lead@campus.edu".to_string())
        );
    }

    #[test]
    fn test_create_club_dto_requires_leader() {
        let dto = CreateClubDto {
            name: "Robotics".to_string(),
            description: "Builds robots".to_string(),
            advisor: "advisor@campus.edu".to_string(),
            leader: String::new(),
            logo: None,
            banner: None,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("leader"));
    }
}
