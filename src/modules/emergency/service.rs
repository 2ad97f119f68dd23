use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::metrics::track_emergency_reported;

use super::model::{
    CreateEmergencyAlertDto, EmergencyAlert, EmergencyFilter, EmergencyStatus, Responder,
};

const ALERT_SELECT: &str = r#"
    SELECT a.id, a.student_id, s.name AS student_name, s.email AS student_email,
           a.latitude, a.longitude, a.address, a.emergency_type, a.description,
           a.status, a.reported_at, a.resolved_at
    FROM emergency_alerts a
    JOIN students s ON s.id = a.student_id
"#;

fn alert_not_found() -> AppError {
    AppError::not_found(anyhow!("Alert not found"))
}

/// The responder contact to record for a status change, if any.
/// Moving to `responded` without a contact is rejected.
pub fn responder_contact_for(
    status: EmergencyStatus,
    contact: Option<String>,
) -> Result<Option<String>, AppError> {
    let contact = contact
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    match (status, contact) {
        (EmergencyStatus::Responded, None) => Err(AppError::bad_request(anyhow!(
            "Responder contact is required"
        ))),
        (EmergencyStatus::Responded, contact) => Ok(contact),
        _ => Ok(None),
    }
}

pub struct EmergencyService;

impl EmergencyService {
    #[instrument(skip(db, dto), fields(alert.kind = %dto.emergency_type, db.operation = "INSERT", db.table = "emergency_alerts"))]
    pub async fn create(
        db: &PgPool,
        student_id: Uuid,
        dto: CreateEmergencyAlertDto,
    ) -> Result<EmergencyAlert, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO emergency_alerts
                (student_id, latitude, longitude, address, emergency_type, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(student_id)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(&dto.address)
        .bind(&dto.emergency_type)
        .bind(&dto.description)
        .fetch_one(db)
        .await?;

        track_emergency_reported();
        warn!(alert.id = %id, student.id = %student_id, "Emergency alert reported");
        Self::get_alert(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_alert(db: &PgPool, alert_id: Uuid) -> Result<EmergencyAlert, AppError> {
        let mut alert = sqlx::query_as::<_, EmergencyAlert>(&format!("{ALERT_SELECT} WHERE a.id = $1"))
            .bind(alert_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(alert_not_found)?;

        alert.responders = sqlx::query_as::<_, Responder>(
            r#"
            SELECT id, alert_id, responder_id, responder_contact, responded_at
            FROM emergency_responders
            WHERE alert_id = $1
            ORDER BY responded_at
            "#,
        )
        .bind(alert_id)
        .fetch_all(db)
        .await?;

        Ok(alert)
    }

    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, filter: EmergencyFilter) -> Result<Vec<EmergencyAlert>, AppError> {
        let alerts = sqlx::query_as::<_, EmergencyAlert>(&format!(
            r#"
            {ALERT_SELECT}
            WHERE ($1::emergency_status IS NULL OR a.status = $1)
            ORDER BY a.reported_at DESC
            "#
        ))
        .bind(filter.status)
        .fetch_all(db)
        .await?;
        Ok(alerts)
    }

    #[instrument(skip(db))]
    pub async fn list_for_student(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<EmergencyAlert>, AppError> {
        let alerts = sqlx::query_as::<_, EmergencyAlert>(&format!(
            "{ALERT_SELECT} WHERE a.student_id = $1 ORDER BY a.reported_at DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;
        Ok(alerts)
    }

    /// Sets the status, recording a responder row for `responded` and the
    /// resolution time for `resolved`.
    #[instrument(skip(db, contact), fields(db.operation = "UPDATE", db.table = "emergency_alerts"))]
    pub async fn update_status(
        db: &PgPool,
        alert_id: Uuid,
        responder_id: Uuid,
        status: EmergencyStatus,
        contact: Option<String>,
    ) -> Result<EmergencyAlert, AppError> {
        let contact = responder_contact_for(status, contact)?;

        let mut tx = db.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE emergency_alerts
            SET status = $2,
                resolved_at = CASE WHEN $2 = 'resolved'::emergency_status THEN NOW() ELSE resolved_at END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(alert_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(alert_not_found());
        }

        if let Some(contact) = &contact {
            sqlx::query(
                "INSERT INTO emergency_responders (alert_id, responder_id, responder_contact) VALUES ($1, $2, $3)",
            )
            .bind(alert_id)
            .bind(responder_id)
            .bind(contact)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(alert.id = %alert_id, status = ?status, "Emergency alert status updated");
        Self::get_alert(db, alert_id).await
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "emergency_alerts"))]
    pub async fn cancel(
        db: &PgPool,
        alert_id: Uuid,
        student_id: Uuid,
    ) -> Result<EmergencyAlert, AppError> {
        let alert = Self::get_alert(db, alert_id).await?;
        if alert.student_id != student_id {
            warn!(alert.id = %alert_id, student.id = %student_id, "Alert cancel by non-owner");
            return Err(AppError::forbidden("Forbidden"));
        }

        let result = sqlx::query(
            r#"
            UPDATE emergency_alerts
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('resolved', 'cancelled')
            "#,
        )
        .bind(alert_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!("Alert is already closed")));
        }

        info!(alert.id = %alert_id, "Emergency alert cancelled");
        Self::get_alert(db, alert_id).await
    }
}
