use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use campusdesk_core::serde::empty_string_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Internship,
    Workshop,
    Hackathon,
    Seminar,
    Competition,
    ClubEvent,
}

impl FromStr for EventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internship" => Ok(Self::Internship),
            "workshop" => Ok(Self::Workshop),
            "hackathon" => Ok(Self::Hackathon),
            "seminar" => Ok(Self::Seminar),
            "competition" => Ok(Self::Competition),
            "club_event" => Ok(Self::ClubEvent),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "organizer_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrganizerType {
    Faculty,
    Club,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl FromStr for EventStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

impl EventStatus {
    pub fn accepts_registrations(self) -> bool {
        matches!(self, Self::Upcoming | Self::Ongoing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub event_type: EventType,
    pub domain: Option<String>,
    pub faculty_id: Option<Uuid>,
    pub faculty_name: Option<String>,
    pub club_id: Option<Uuid>,
    pub club_name: Option<String>,
    pub organizer_type: OrganizerType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub max_participants: Option<i32>,
    pub status: EventStatus,
    pub registration_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentEvent {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub event: Event,
    pub is_registered: bool,
}

/// Validated event input, organized either by a faculty member or a club.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub event_type: EventType,
    pub domain: Option<String>,
    pub faculty_id: Option<Uuid>,
    pub club_id: Option<Uuid>,
    pub organizer_type: OrganizerType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub max_participants: Option<i32>,
}

/// Fields an organizer may change, read from the update form. `None` keeps
/// the stored value.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub event_type: Option<EventType>,
    pub domain: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EventFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub domain: Option<String>,
    pub event_type: Option<EventType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse() {
        assert_eq!("Workshop".parse(), Ok(EventType::Workshop));
        assert_eq!("club_event".parse(), Ok(EventType::ClubEvent));
        assert!("party".parse::<EventType>().is_err());
    }

    #[test]
    fn test_registration_open_statuses() {
        assert!(EventStatus::Upcoming.accepts_registrations());
        assert!(EventStatus::Ongoing.accepts_registrations());
        assert!(!EventStatus::Completed.accepts_registrations());
        assert!(!EventStatus::Cancelled.accepts_registrations());
    }

    #[test]
    fn test_event_status_parse() {
        assert_eq!(" Cancelled ".parse(), Ok(EventStatus::Cancelled));
        assert!("postponed".parse::<EventStatus>().is_err());
    }
}
