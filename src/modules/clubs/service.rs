use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::modules::events::{Event, EventService, EventType, NewEvent, OrganizerType};

use super::model::{
    AccountLookup, Club, ClubAnnouncement, ClubDetail, ClubFilter, ClubMember, CreateClubDto,
    CreateClubEventDto, GalleryImage, MembershipStatus, UpdateClubDto,
};

const CLUB_SELECT: &str = r#"
    SELECT c.id, c.name, c.description, c.logo, c.banner,
           c.advisor_id, f.name AS advisor_name, f.email AS advisor_email,
           c.leader_id, s.name AS leader_name, s.email AS leader_email,
           (SELECT COUNT(*) FROM club_memberships m
            WHERE m.club_id = c.id AND m.status = 'approved') AS member_count,
           c.created_at, c.updated_at
    FROM clubs c
    LEFT JOIN faculty f ON f.id = c.advisor_id
    LEFT JOIN students s ON s.id = c.leader_id
"#;

const MEMBER_SELECT: &str = r#"
    SELECT m.student_id, s.name, s.email, m.status, m.created_at
    FROM club_memberships m
    JOIN students s ON s.id = m.student_id
"#;

pub const LEADER_OR_ADVISOR: &str = "Only the club leader or advisor can perform this action";

fn club_not_found() -> AppError {
    AppError::not_found(anyhow!("Club not found"))
}

/// Whether `user_id` may manage the club's content and membership.
pub fn can_manage(club: &Club, user_id: Uuid) -> bool {
    club.leader_id == Some(user_id) || club.advisor_id == Some(user_id)
}

pub struct ClubService;

impl ClubService {
    async fn resolve_account(
        db: &PgPool,
        table: &'static str,
        raw: &str,
        not_found: &'static str,
    ) -> Result<Uuid, AppError> {
        let found = match AccountLookup::parse(raw) {
            AccountLookup::Id(id) => {
                sqlx::query_scalar::<_, Uuid>(&format!("SELECT id FROM {table} WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(db)
                    .await?
            }
            AccountLookup::Email(email) => {
                sqlx::query_scalar::<_, Uuid>(&format!(
                    "SELECT id FROM {table} WHERE LOWER(email) = $1"
                ))
                .bind(email)
                .fetch_optional(db)
                .await?
            }
        };
        found.ok_or_else(|| AppError::not_found(anyhow!(not_found)))
    }

    /// Creates the club and enrolls its leader as an approved member.
    #[instrument(skip(db, dto), fields(club.name = %dto.name, db.operation = "INSERT", db.table = "clubs"))]
    pub async fn create(db: &PgPool, dto: CreateClubDto) -> Result<Club, AppError> {
        let advisor_id = Self::resolve_account(db, "faculty", &dto.advisor, "Advisor not found").await?;
        let leader_id = Self::resolve_account(db, "students", &dto.leader, "Leader not found").await?;

        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO clubs (name, description, logo, banner, advisor_id, leader_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(&dto.logo)
        .bind(&dto.banner)
        .bind(advisor_id)
        .bind(leader_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow!("Club already exists"));
            }
            AppError::from(e)
        })?;

        sqlx::query(
            "INSERT INTO club_memberships (club_id, student_id, status) VALUES ($1, $2, 'approved')",
        )
        .bind(id)
        .bind(leader_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(club.id = %id, "Club created");
        Self::get_club(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_club(db: &PgPool, club_id: Uuid) -> Result<Club, AppError> {
        sqlx::query_as::<_, Club>(&format!("{CLUB_SELECT} WHERE c.id = $1"))
            .bind(club_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(club_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, filter: ClubFilter) -> Result<Vec<Club>, AppError> {
        let pattern = filter.search.map(|s| format!("%{}%", s.trim()));
        let clubs = sqlx::query_as::<_, Club>(&format!(
            r#"
            {CLUB_SELECT}
            WHERE ($1::text IS NULL OR c.name ILIKE $1 OR c.description ILIKE $1)
            ORDER BY c.name
            "#
        ))
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(clubs)
    }

    #[instrument(skip(db))]
    pub async fn get_detail(db: &PgPool, club_id: Uuid) -> Result<ClubDetail, AppError> {
        let club = Self::get_club(db, club_id).await?;

        let members = sqlx::query_as::<_, ClubMember>(&format!(
            "{MEMBER_SELECT} WHERE m.club_id = $1 AND m.status = 'approved' ORDER BY m.created_at"
        ))
        .bind(club_id)
        .fetch_all(db)
        .await?;

        let announcements = sqlx::query_as::<_, ClubAnnouncement>(
            "SELECT id, club_id, title, content, date FROM club_announcements WHERE club_id = $1 ORDER BY date DESC",
        )
        .bind(club_id)
        .fetch_all(db)
        .await?;

        let gallery = sqlx::query_as::<_, GalleryImage>(
            "SELECT id, club_id, image_url, created_at FROM club_gallery WHERE club_id = $1 ORDER BY created_at DESC",
        )
        .bind(club_id)
        .fetch_all(db)
        .await?;

        let events = EventService::list_for_club(db, club_id).await?;

        Ok(ClubDetail {
            club,
            members,
            announcements,
            gallery,
            events,
        })
    }

    /// Loads the club and checks the caller is its leader or advisor.
    pub async fn ensure_manager(db: &PgPool, club_id: Uuid, user_id: Uuid) -> Result<Club, AppError> {
        let club = Self::get_club(db, club_id).await?;
        if !can_manage(&club, user_id) {
            warn!(club.id = %club_id, user.id = %user_id, "Club action by non-manager");
            return Err(AppError::forbidden(LEADER_OR_ADVISOR));
        }
        Ok(club)
    }

    #[instrument(skip(db), fields(db.operation = "INSERT", db.table = "club_memberships"))]
    pub async fn join(db: &PgPool, club_id: Uuid, student_id: Uuid) -> Result<(), AppError> {
        Self::get_club(db, club_id).await?;

        let existing = sqlx::query_scalar::<_, MembershipStatus>(
            "SELECT status FROM club_memberships WHERE club_id = $1 AND student_id = $2",
        )
        .bind(club_id)
        .bind(student_id)
        .fetch_optional(db)
        .await?;

        match existing {
            Some(MembershipStatus::Approved) => {
                return Err(AppError::bad_request(anyhow!("Already a member")));
            }
            Some(MembershipStatus::Pending) => {
                return Err(AppError::bad_request(anyhow!("Join request already pending")));
            }
            None => {}
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO club_memberships (club_id, student_id, status)
            VALUES ($1, $2, 'pending')
            ON CONFLICT (club_id, student_id) DO NOTHING
            "#,
        )
        .bind(club_id)
        .bind(student_id)
        .execute(db)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!("Join request already pending")));
        }

        info!(club.id = %club_id, student.id = %student_id, "Club join requested");
        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "club_memberships"))]
    pub async fn leave(db: &PgPool, club_id: Uuid, student_id: Uuid) -> Result<(), AppError> {
        let club = Self::get_club(db, club_id).await?;
        if club.leader_id == Some(student_id) {
            return Err(AppError::bad_request(anyhow!("Club leader cannot leave the club")));
        }

        let result = sqlx::query(
            "DELETE FROM club_memberships WHERE club_id = $1 AND student_id = $2 AND status = 'approved'",
        )
        .bind(club_id)
        .bind(student_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!("Not a member")));
        }

        info!(club.id = %club_id, student.id = %student_id, "Student left club");
        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        club_id: Uuid,
        user_id: Uuid,
        dto: UpdateClubDto,
    ) -> Result<Club, AppError> {
        let club = Self::get_club(db, club_id).await?;
        if club.leader_id != Some(user_id) {
            warn!(club.id = %club_id, user.id = %user_id, "Club update by non-leader");
            return Err(AppError::forbidden("Only the club leader can update the club"));
        }

        sqlx::query(
            r#"
            UPDATE clubs
            SET description = COALESCE($2, description),
                logo = COALESCE($3, logo),
                banner = COALESCE($4, banner),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(club_id)
        .bind(&dto.description)
        .bind(&dto.logo)
        .bind(&dto.banner)
        .execute(db)
        .await?;

        info!(club.id = %club_id, "Club updated");
        Self::get_club(db, club_id).await
    }

    #[instrument(skip(db, content), fields(db.operation = "INSERT", db.table = "club_announcements"))]
    pub async fn add_announcement(
        db: &PgPool,
        club_id: Uuid,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<ClubAnnouncement, AppError> {
        Self::ensure_manager(db, club_id, user_id).await?;

        let announcement = sqlx::query_as::<_, ClubAnnouncement>(
            r#"
            INSERT INTO club_announcements (club_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, club_id, title, content, date
            "#,
        )
        .bind(club_id)
        .bind(title)
        .bind(content)
        .fetch_one(db)
        .await?;

        info!(club.id = %club_id, announcement.id = %announcement.id, "Club announcement posted");
        Ok(announcement)
    }

    #[instrument(skip(db), fields(db.operation = "INSERT", db.table = "club_gallery"))]
    pub async fn add_gallery_image(
        db: &PgPool,
        club_id: Uuid,
        image_url: &str,
    ) -> Result<GalleryImage, AppError> {
        let image = sqlx::query_as::<_, GalleryImage>(
            r#"
            INSERT INTO club_gallery (club_id, image_url)
            VALUES ($1, $2)
            RETURNING id, club_id, image_url, created_at
            "#,
        )
        .bind(club_id)
        .bind(image_url)
        .fetch_one(db)
        .await?;
        Ok(image)
    }

    #[instrument(skip(db))]
    pub async fn pending_requests(
        db: &PgPool,
        club_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ClubMember>, AppError> {
        Self::ensure_manager(db, club_id, user_id).await?;

        let members = sqlx::query_as::<_, ClubMember>(&format!(
            "{MEMBER_SELECT} WHERE m.club_id = $1 AND m.status = 'pending' ORDER BY m.created_at"
        ))
        .bind(club_id)
        .fetch_all(db)
        .await?;
        Ok(members)
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "club_memberships"))]
    pub async fn approve(
        db: &PgPool,
        club_id: Uuid,
        user_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        Self::ensure_manager(db, club_id, user_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE club_memberships SET status = 'approved'
            WHERE club_id = $1 AND student_id = $2 AND status = 'pending'
            "#,
        )
        .bind(club_id)
        .bind(student_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("No pending request found")));
        }

        info!(club.id = %club_id, student.id = %student_id, "Club membership approved");
        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "club_memberships"))]
    pub async fn reject(
        db: &PgPool,
        club_id: Uuid,
        user_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        Self::ensure_manager(db, club_id, user_id).await?;

        let result = sqlx::query(
            "DELETE FROM club_memberships WHERE club_id = $1 AND student_id = $2 AND status = 'pending'",
        )
        .bind(club_id)
        .bind(student_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("No pending request found")));
        }

        info!(club.id = %club_id, student.id = %student_id, "Club membership rejected");
        Ok(())
    }

    #[instrument(skip(db, dto), fields(event.title = %dto.title))]
    pub async fn create_event(
        db: &PgPool,
        club_id: Uuid,
        user_id: Uuid,
        dto: CreateClubEventDto,
    ) -> Result<Event, AppError> {
        Self::ensure_manager(db, club_id, user_id).await?;

        EventService::create(
            db,
            NewEvent {
                title: dto.title,
                description: dto.description,
                image: None,
                event_type: EventType::ClubEvent,
                domain: dto.domain,
                faculty_id: None,
                club_id: Some(club_id),
                organizer_type: OrganizerType::Club,
                start_date: dto.start_date,
                end_date: dto.end_date,
                location: dto.location,
                max_participants: dto.max_participants,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn club(advisor_id: Option<Uuid>, leader_id: Option<Uuid>) -> Club {
        Club {
            id: Uuid::new_v4(),
            name: "Robotics".to_string(),
            description: "Builds robots".to_string(),
            logo: None,
            banner: None,
            advisor_id,
            advisor_name: None,
            advisor_email: None,
            leader_id,
            leader_name: None,
            leader_email: None,
            member_count: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_leader_and_advisor_can_manage() {
        let advisor = Uuid::new_v4();
        let leader = Uuid::new_v4();
        let club = club(Some(advisor), Some(leader));

        assert!(can_manage(&club, advisor));
        assert!(can_manage(&club, leader));
        assert!(!can_manage(&club, Uuid::new_v4()));
    }

    #[test]
    fn test_orphaned_club_has_no_manager() {
        assert!(!can_manage(&club(None, None), Uuid::new_v4()));
    }
}
