use anyhow::anyhow;
use campusdesk_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::{Event, EventChanges, EventFilter, EventStatus, NewEvent, StudentEvent};

const EVENT_COLUMNS: &str = r#"
    e.id, e.title, e.description, e.image, e.event_type, e.domain,
    e.faculty_id, f.name AS faculty_name,
    e.club_id, c.name AS club_name,
    e.organizer_type, e.start_date, e.end_date, e.location,
    e.max_participants, e.status,
    (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) AS registration_count,
    e.created_at, e.updated_at
"#;

const EVENT_JOINS: &str = r#"
    FROM events e
    LEFT JOIN faculty f ON f.id = e.faculty_id
    LEFT JOIN clubs c ON c.id = e.club_id
"#;

fn event_not_found() -> AppError {
    AppError::not_found(anyhow!("Event not found"))
}

pub fn validate_schedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::bad_request(anyhow!(
            "End date must be after start date"
        )));
    }
    Ok(())
}

pub struct EventService;

impl EventService {
    #[instrument(skip(db, event), fields(event.title = %event.title, db.operation = "INSERT", db.table = "events"))]
    pub async fn create(db: &PgPool, event: NewEvent) -> Result<Event, AppError> {
        validate_schedule(event.start_date, event.end_date)?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO events
                (title, description, image, event_type, domain, faculty_id, club_id,
                 organizer_type, start_date, end_date, location, max_participants)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.image)
        .bind(event.event_type)
        .bind(&event.domain)
        .bind(event.faculty_id)
        .bind(event.club_id)
        .bind(event.organizer_type)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.location)
        .bind(event.max_participants)
        .fetch_one(db)
        .await?;

        info!(event.id = %id, "Event created");
        Self::get_event(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_event(db: &PgPool, event_id: Uuid) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} {EVENT_JOINS} WHERE e.id = $1"
        ))
        .bind(event_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(event_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list_all(db: &PgPool) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} {EVENT_JOINS} ORDER BY e.start_date DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(events)
    }

    #[instrument(skip(db))]
    pub async fn list_for_faculty(db: &PgPool, faculty_id: Uuid) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} {EVENT_JOINS} WHERE e.faculty_id = $1 ORDER BY e.start_date DESC"
        ))
        .bind(faculty_id)
        .fetch_all(db)
        .await?;
        Ok(events)
    }

    #[instrument(skip(db))]
    pub async fn list_for_club(db: &PgPool, club_id: Uuid) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} {EVENT_JOINS} WHERE e.club_id = $1 ORDER BY e.start_date"
        ))
        .bind(club_id)
        .fetch_all(db)
        .await?;
        Ok(events)
    }

    /// Events a student can see, soonest first, flagged with their registration.
    #[instrument(skip(db))]
    pub async fn list_for_student(
        db: &PgPool,
        student_id: Uuid,
        filter: EventFilter,
    ) -> Result<Vec<StudentEvent>, AppError> {
        let events = sqlx::query_as::<_, StudentEvent>(&format!(
            r#"
            SELECT {EVENT_COLUMNS},
                   EXISTS(SELECT 1 FROM event_registrations r
                          WHERE r.event_id = e.id AND r.student_id = $1) AS is_registered
            {EVENT_JOINS}
            WHERE e.status <> 'cancelled'
              AND ($2::text IS NULL OR e.domain = $2)
              AND ($3::event_type IS NULL OR e.event_type = $3)
            ORDER BY e.start_date ASC
            "#
        ))
        .bind(student_id)
        .bind(&filter.domain)
        .bind(filter.event_type)
        .fetch_all(db)
        .await?;
        Ok(events)
    }

    pub async fn ensure_organizer(db: &PgPool, event_id: Uuid, faculty_id: Uuid) -> Result<Event, AppError> {
        let event = Self::get_event(db, event_id).await?;
        if event.faculty_id != Some(faculty_id) {
            warn!(event.id = %event_id, faculty.id = %faculty_id, "Event change by non-organizer");
            return Err(AppError::forbidden("Forbidden"));
        }
        Ok(event)
    }

    #[instrument(skip(db, changes))]
    pub async fn update(
        db: &PgPool,
        event_id: Uuid,
        faculty_id: Uuid,
        changes: EventChanges,
    ) -> Result<Event, AppError> {
        let current = Self::ensure_organizer(db, event_id, faculty_id).await?;
        validate_schedule(
            changes.start_date.unwrap_or(current.start_date),
            changes.end_date.unwrap_or(current.end_date),
        )?;

        sqlx::query(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_type = COALESCE($4, event_type),
                domain = COALESCE($5, domain),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                location = COALESCE($8, location),
                max_participants = COALESCE($9, max_participants),
                status = COALESCE($10, status),
                image = COALESCE($11, image),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.event_type)
        .bind(&changes.domain)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(&changes.location)
        .bind(changes.max_participants)
        .bind(changes.status)
        .bind(&changes.image)
        .execute(db)
        .await?;

        info!(event.id = %event_id, "Event updated");
        Self::get_event(db, event_id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "events"))]
    pub async fn delete(db: &PgPool, event_id: Uuid, faculty_id: Uuid) -> Result<(), AppError> {
        Self::ensure_organizer(db, event_id, faculty_id).await?;

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(db)
            .await?;

        info!(event.id = %event_id, "Event deleted");
        Ok(())
    }

    /// Registers a student. The event row stays locked until commit so the
    /// capacity check and the insert cannot interleave with another registration.
    #[instrument(skip(db), fields(db.operation = "INSERT", db.table = "event_registrations"))]
    pub async fn register(db: &PgPool, event_id: Uuid, student_id: Uuid) -> Result<Event, AppError> {
        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let (status, max_participants) = sqlx::query_as::<_, (EventStatus, Option<i32>)>(
            "SELECT status, max_participants FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(event_not_found)?;

        if !status.accepts_registrations() {
            return Err(AppError::bad_request(anyhow!(
                "Event is not open for registration"
            )));
        }

        let already = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND student_id = $2)",
        )
        .bind(event_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Err(AppError::bad_request(anyhow!("Already registered")));
        }

        if let Some(capacity) = max_participants {
            let registered = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1",
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;
            if registered >= i64::from(capacity) {
                return Err(AppError::bad_request(anyhow!("Event is full")));
            }
        }

        sqlx::query("INSERT INTO event_registrations (event_id, student_id) VALUES ($1, $2)")
            .bind(event_id)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(event.id = %event_id, student.id = %student_id, "Student registered for event");
        Self::get_event(db, event_id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "event_registrations"))]
    pub async fn unregister(db: &PgPool, event_id: Uuid, student_id: Uuid) -> Result<Event, AppError> {
        let result = sqlx::query(
            "DELETE FROM event_registrations WHERE event_id = $1 AND student_id = $2",
        )
        .bind(event_id)
        .bind(student_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            Self::get_event(db, event_id).await?;
            return Err(AppError::bad_request(anyhow!(
                "Not registered for this event"
            )));
        }

        info!(event.id = %event_id, student.id = %student_id, "Student unregistered from event");
        Self::get_event(db, event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_schedule_requires_end_after_start() {
        let start = Utc::now();
        assert!(validate_schedule(start, start + Duration::hours(2)).is_ok());

        let err = validate_schedule(start, start).unwrap_err();
        assert_eq!(err.error.to_string(), "End date must be after start date");
        assert!(validate_schedule(start, start - Duration::minutes(1)).is_err());
    }
}
