use anyhow::anyhow;
use campusdesk_auth::Role;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::{
    Announcement, AnnouncementCategory, AnnouncementFilter, CreateAnnouncementDto,
    UpdateAnnouncementDto,
};

// Authors may live in any account table, so the name is looked up in each.
const ANNOUNCEMENT_SELECT: &str = r#"
    SELECT a.id, a.title, a.content, a.category, a.author_id, a.author_role,
           COALESCE(
               (SELECT name FROM admins WHERE id = a.author_id),
               (SELECT name FROM faculty WHERE id = a.author_id),
               (SELECT name FROM authorities WHERE id = a.author_id),
               (SELECT name FROM students WHERE id = a.author_id)
           ) AS author_name,
           a.image, a.priority, a.send_email, a.send_push,
           a.published_at, a.expires_at, a.created_at, a.updated_at
    FROM campus_announcements a
"#;

const NOT_EXPIRED: &str = "(a.expires_at IS NULL OR a.expires_at > NOW())";

fn announcement_not_found() -> AppError {
    AppError::not_found(anyhow!("Announcement not found"))
}

pub struct AnnouncementService;

impl AnnouncementService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "campus_announcements"))]
    pub async fn create(
        db: &PgPool,
        author_id: Uuid,
        author_role: Role,
        dto: CreateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO campus_announcements
                (title, content, category, author_id, author_role, image,
                 priority, send_email, send_push, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(dto.category)
        .bind(author_id)
        .bind(author_role.as_str())
        .bind(&dto.image)
        .bind(dto.priority.unwrap_or_default())
        .bind(dto.send_email)
        .bind(dto.send_push)
        .bind(dto.expires_at)
        .fetch_one(db)
        .await?;

        info!(announcement.id = %id, author.role = %author_role, "Announcement published");
        Self::get_announcement(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_announcement(db: &PgPool, id: Uuid) -> Result<Announcement, AppError> {
        sqlx::query_as::<_, Announcement>(&format!("{ANNOUNCEMENT_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(announcement_not_found)
    }

    /// Unexpired announcements, newest first.
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filter: AnnouncementFilter,
    ) -> Result<Vec<Announcement>, AppError> {
        let pattern = filter.search.map(|s| format!("%{}%", s.trim()));
        let announcements = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            {ANNOUNCEMENT_SELECT}
            WHERE {NOT_EXPIRED}
              AND ($1::announcement_category IS NULL OR a.category = $1)
              AND ($2::announcement_priority IS NULL OR a.priority = $2)
              AND ($3::text IS NULL OR a.title ILIKE $3 OR a.content ILIKE $3)
            ORDER BY a.published_at DESC
            "#
        ))
        .bind(filter.category)
        .bind(filter.priority)
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(announcements)
    }

    pub async fn search(db: &PgPool, query: String) -> Result<Vec<Announcement>, AppError> {
        Self::list(
            db,
            AnnouncementFilter {
                search: Some(query),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn list_by_category(
        db: &PgPool,
        category: AnnouncementCategory,
    ) -> Result<Vec<Announcement>, AppError> {
        Self::list(
            db,
            AnnouncementFilter {
                category: Some(category),
                ..Default::default()
            },
        )
        .await
    }

    async fn ensure_author(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let announcement = Self::get_announcement(db, id).await?;
        if announcement.author_id != user_id {
            warn!(announcement.id = %id, user.id = %user_id, "Announcement change by non-author");
            return Err(AppError::forbidden("Forbidden"));
        }
        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
        dto: UpdateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        Self::ensure_author(db, id, user_id).await?;

        sqlx::query(
            r#"
            UPDATE campus_announcements
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                category = COALESCE($4, category),
                priority = COALESCE($5, priority),
                image = COALESCE($6, image),
                expires_at = COALESCE($7, expires_at),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(dto.category)
        .bind(dto.priority)
        .bind(&dto.image)
        .bind(dto.expires_at)
        .execute(db)
        .await?;

        info!(announcement.id = %id, "Announcement updated");
        Self::get_announcement(db, id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "campus_announcements"))]
    pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        Self::ensure_author(db, id, user_id).await?;

        sqlx::query("DELETE FROM campus_announcements WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(announcement.id = %id, "Announcement deleted");
        Ok(())
    }
}
