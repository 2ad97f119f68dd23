use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::{LostFoundFilter, LostFoundItem, NewLostFoundItem, UpdateLostFoundDto};

const ITEM_SELECT: &str = r#"
    SELECT i.id, i.title, i.description, i.category, i.item_type, i.image, i.location,
           i.date_reported, i.student_id, s.name AS student_name, s.email AS student_email,
           i.contact_phone, i.contact_email, i.status,
           i.claimed_by, c.name AS claimed_by_name, i.claim_date,
           i.created_at, i.updated_at
    FROM lost_found_items i
    JOIN students s ON s.id = i.student_id
    LEFT JOIN students c ON c.id = i.claimed_by
"#;

fn item_not_found() -> AppError {
    AppError::not_found(anyhow!("Item not found"))
}

pub struct LostFoundService;

impl LostFoundService {
    #[instrument(skip(db, item), fields(db.operation = "INSERT", db.table = "lost_found_items"))]
    pub async fn create(
        db: &PgPool,
        student_id: Uuid,
        item: NewLostFoundItem,
    ) -> Result<LostFoundItem, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO lost_found_items
                (title, description, category, item_type, image, location,
                 student_id, contact_phone, contact_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.category)
        .bind(&item.item_type)
        .bind(&item.image)
        .bind(&item.location)
        .bind(student_id)
        .bind(&item.contact_phone)
        .bind(&item.contact_email)
        .fetch_one(db)
        .await?;

        info!(item.id = %id, "Lost & found item reported");
        Self::get_item(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_item(db: &PgPool, item_id: Uuid) -> Result<LostFoundItem, AppError> {
        sqlx::query_as::<_, LostFoundItem>(&format!("{ITEM_SELECT} WHERE i.id = $1"))
            .bind(item_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(item_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, filter: LostFoundFilter) -> Result<Vec<LostFoundItem>, AppError> {
        let items = sqlx::query_as::<_, LostFoundItem>(&format!(
            r#"{ITEM_SELECT}
            WHERE ($1::lost_found_category IS NULL OR i.category = $1)
              AND ($2::lost_found_status IS NULL OR i.status = $2)
            ORDER BY i.created_at DESC"#
        ))
        .bind(filter.category)
        .bind(filter.status)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    #[instrument(skip(db))]
    pub async fn list_for_student(db: &PgPool, student_id: Uuid) -> Result<Vec<LostFoundItem>, AppError> {
        let items = sqlx::query_as::<_, LostFoundItem>(&format!(
            "{ITEM_SELECT} WHERE i.student_id = $1 ORDER BY i.created_at DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    /// Only an `open` item can be claimed, whoever asks. The status check and
    /// the write are one statement, so two claimants cannot both succeed.
    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "lost_found_items"))]
    pub async fn claim(db: &PgPool, item_id: Uuid, student_id: Uuid) -> Result<LostFoundItem, AppError> {
        let claimed = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE lost_found_items
            SET status = 'claimed', claimed_by = $2, claim_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'open'
            RETURNING id
            "#,
        )
        .bind(item_id)
        .bind(student_id)
        .fetch_optional(db)
        .await?;

        if claimed.is_none() {
            // Distinguish a missing item from one that is no longer open.
            Self::get_item(db, item_id).await?;
            return Err(AppError::bad_request(anyhow!(
                "Item is not available for claiming"
            )));
        }

        info!(item.id = %item_id, student.id = %student_id, "Item claimed");
        Self::get_item(db, item_id).await
    }

    async fn ensure_owner(db: &PgPool, item_id: Uuid, student_id: Uuid) -> Result<(), AppError> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT student_id FROM lost_found_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(item_not_found)?;

        if owner != student_id {
            warn!(item.id = %item_id, student.id = %student_id, "Lost & found change by non-owner");
            return Err(AppError::forbidden("Forbidden"));
        }
        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        item_id: Uuid,
        student_id: Uuid,
        dto: UpdateLostFoundDto,
    ) -> Result<LostFoundItem, AppError> {
        Self::ensure_owner(db, item_id, student_id).await?;

        sqlx::query(
            r#"
            UPDATE lost_found_items
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.location)
        .bind(dto.status)
        .execute(db)
        .await?;

        Self::get_item(db, item_id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "lost_found_items"))]
    pub async fn delete(db: &PgPool, item_id: Uuid, student_id: Uuid) -> Result<(), AppError> {
        Self::ensure_owner(db, item_id, student_id).await?;

        sqlx::query("DELETE FROM lost_found_items WHERE id = $1")
            .bind(item_id)
            .execute(db)
            .await?;

        info!(item.id = %item_id, "Lost & found item deleted");
        Ok(())
    }
}
