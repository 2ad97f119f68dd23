use anyhow::anyhow;
use axum::extract::{Multipart, Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{RequireAdmin, RequireFaculty, RequireStudent};
use crate::state::AppState;
use crate::utils::multipart::{MultipartForm, image_from_form};

use super::model::{
    Event, EventChanges, EventFilter, EventStatus, EventType, NewEvent, OrganizerType,
    StudentEvent,
};
use super::service::{EventService, validate_schedule};

fn event_from_form(form: &MultipartForm, faculty_id: Uuid) -> Result<NewEvent, AppError> {
    let missing = || AppError::bad_request(anyhow!("All required fields must be provided"));
    let field = |name: &str| form.text(name).ok_or_else(missing);

    let start_date = form
        .parse::<DateTime<Utc>>("start_date", "Invalid start date")?
        .ok_or_else(missing)?;
    let end_date = form
        .parse::<DateTime<Utc>>("end_date", "Invalid end date")?
        .ok_or_else(missing)?;

    let event = NewEvent {
        title: field("title")?,
        description: field("description")?,
        image: None,
        event_type: form
            .parse::<EventType>("event_type", "Invalid event type")?
            .ok_or_else(missing)?,
        domain: form.text("domain"),
        faculty_id: Some(faculty_id),
        club_id: None,
        organizer_type: OrganizerType::Faculty,
        start_date,
        end_date,
        location: field("location")?,
        max_participants: form.parse::<i32>("max_participants", "Invalid max participants")?,
    };

    validate_schedule(event.start_date, event.end_date)?;
    if event.max_participants.is_some_and(|max| max < 1) {
        return Err(AppError::bad_request(anyhow!("Invalid max participants")));
    }
    Ok(event)
}

/// Text fields of the update form. Absent or blank fields stay unchanged.
fn event_changes_from_form(form: &MultipartForm) -> Result<EventChanges, AppError> {
    let changes = EventChanges {
        title: form.text("title"),
        description: form.text("description"),
        image: None,
        event_type: form.parse::<EventType>("event_type", "Invalid event type")?,
        domain: form.text("domain"),
        start_date: form.parse::<DateTime<Utc>>("start_date", "Invalid start date")?,
        end_date: form.parse::<DateTime<Utc>>("end_date", "Invalid end date")?,
        location: form.text("location"),
        max_participants: form.parse::<i32>("max_participants", "Invalid max participants")?,
        status: form.parse::<EventStatus>("status", "Invalid event status")?,
    };

    if changes.max_participants.is_some_and(|max| max < 1) {
        return Err(AppError::bad_request(anyhow!("Invalid max participants")));
    }
    Ok(changes)
}

/// Create an event
///
/// Multipart fields: `title`, `description`, `event_type`, `start_date`,
/// `end_date` (RFC 3339), `location`, optional `domain`, `max_participants`
/// and `image`.
#[utoipa::path(
    post,
    path = "/api/v1/event/create",
    request_body(content_type = "multipart/form-data", description = "Event form"),
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Missing fields or end date before start date", body = ErrorResponse),
        (status = 403, description = "Faculty only", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn create_event(
    State(state): State<AppState>,
    RequireFaculty(auth_user): RequireFaculty,
    multipart: Multipart,
) -> Result<ApiResponse<Event>, AppError> {
    let mut form = MultipartForm::collect(multipart).await?;
    let mut event = event_from_form(&form, auth_user.user_id()?)?;
    event.image = image_from_form(state.storage.as_ref(), "events", &mut form).await?;

    let event = EventService::create(&state.db, event).await?;
    Ok(ApiResponse::created("Event created successfully", event))
}

#[utoipa::path(
    get,
    path = "/api/v1/event/faculty/events",
    responses((status = 200, description = "Events I organize", body = Vec<Event>)),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_faculty_events(
    State(state): State<AppState>,
    RequireFaculty(auth_user): RequireFaculty,
) -> Result<ApiResponse<Vec<Event>>, AppError> {
    let events = EventService::list_for_faculty(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Events fetched successfully", events))
}

/// Update an event
///
/// Multipart fields, all optional: `title`, `description`, `event_type`,
/// `domain`, `start_date`, `end_date`, `location`, `max_participants`,
/// `status` and `image` as a file or a URL.
#[utoipa::path(
    patch,
    path = "/api/v1/event/update/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body(content_type = "multipart/form-data", description = "Changed event fields"),
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Invalid field or end date before start date", body = ErrorResponse),
        (status = 403, description = "Not the organizer", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn update_event(
    State(state): State<AppState>,
    RequireFaculty(auth_user): RequireFaculty,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<ApiResponse<Event>, AppError> {
    let faculty_id = auth_user.user_id()?;
    let mut form = MultipartForm::collect(multipart).await?;
    let mut changes = event_changes_from_form(&form)?;

    let current = EventService::ensure_organizer(&state.db, id, faculty_id).await?;
    validate_schedule(
        changes.start_date.unwrap_or(current.start_date),
        changes.end_date.unwrap_or(current.end_date),
    )?;
    changes.image = image_from_form(state.storage.as_ref(), "events", &mut form).await?;

    let event = EventService::update(&state.db, id, faculty_id, changes).await?;
    Ok(ApiResponse::ok("Event updated successfully", event))
}

#[utoipa::path(
    delete,
    path = "/api/v1/event/delete/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 403, description = "Not the organizer", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    RequireFaculty(auth_user): RequireFaculty,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    EventService::delete(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::empty("Event deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/event/student/events",
    params(EventFilter),
    responses((status = 200, description = "Open events, soonest first", body = Vec<StudentEvent>)),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_events(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Query(filter): Query<EventFilter>,
) -> Result<ApiResponse<Vec<StudentEvent>>, AppError> {
    let events = EventService::list_for_student(&state.db, auth_user.user_id()?, filter).await?;
    Ok(ApiResponse::ok("Events fetched successfully", events))
}

#[utoipa::path(
    post,
    path = "/api/v1/event/register/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Registered", body = Event),
        (status = 400, description = "Already registered, full or closed", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn register_for_event(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Event>, AppError> {
    let event = EventService::register(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Registered for event successfully", event))
}

#[utoipa::path(
    post,
    path = "/api/v1/event/unregister/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Registration cancelled", body = Event),
        (status = 400, description = "Not registered for this event", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn unregister_from_event(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Event>, AppError> {
    let event = EventService::unregister(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Unregistered from event successfully", event))
}

#[utoipa::path(
    get,
    path = "/api/v1/event/all",
    responses(
        (status = 200, description = "Every event", body = Vec<Event>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn get_all_events(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<ApiResponse<Vec<Event>>, AppError> {
    let events = EventService::list_all(&state.db).await?;
    Ok(ApiResponse::ok("Events fetched successfully", events))
}

#[utoipa::path(
    get,
    path = "/api/v1/event/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event with registration count", body = Event),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_event(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Event>, AppError> {
    let event = EventService::get_event(&state.db, id).await?;
    Ok(ApiResponse::ok("Event fetched successfully", event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs<'a>(start: &'a str, end: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("title", "Rust workshop"),
            ("description", "Ownership from scratch"),
            ("event_type", "workshop"),
            ("start_date", start),
            ("end_date", end),
            ("location", "Lab 3"),
            ("max_participants", "30"),
        ]
    }

    #[test]
    fn test_event_from_form_builds_faculty_event() {
        let faculty_id = Uuid::new_v4();
        let form = MultipartForm::from_pairs(&pairs("2030-03-01T10:00:00Z", "2030-03-01T12:00:00Z"));
        let event = event_from_form(&form, faculty_id).unwrap();
        assert_eq!(event.faculty_id, Some(faculty_id));
        assert_eq!(event.organizer_type, OrganizerType::Faculty);
        assert_eq!(event.event_type, EventType::Workshop);
        assert_eq!(event.max_participants, Some(30));
    }

    #[test]
    fn test_event_from_form_rejects_inverted_dates() {
        let form = MultipartForm::from_pairs(&pairs("2030-03-01T12:00:00Z", "2030-03-01T10:00:00Z"));
        let err = event_from_form(&form, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.error.to_string(), "End date must be after start date");
    }

    #[test]
    fn test_event_from_form_requires_location() {
        let pairs: Vec<_> = pairs("2030-03-01T10:00:00Z", "2030-03-01T12:00:00Z")
            .into_iter()
            .filter(|(name, _)| *name != "location")
            .collect();
        let err = event_from_form(&MultipartForm::from_pairs(&pairs), Uuid::new_v4()).unwrap_err();
        assert_eq!(err.error.to_string(), "All required fields must be provided");
    }
}
