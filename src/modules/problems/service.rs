use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::metrics::{track_complaint_filed, track_complaint_transition};

use super::model::{
    DomainProblemCounts, NewProblem, PersonalProblemCounts, Problem, ProblemComment,
    ProblemStatus, ProblemWithComments, UpdateProblemDto,
};

const PROBLEM_SELECT: &str = r#"
    SELECT p.id, p.title, p.description, p.image, p.department,
           p.domain_id, d.name AS domain_name,
           p.status, p.priority,
           p.student_id, s.name AS student_name, s.email AS student_email,
           p.accepted_by, a.name AS accepted_by_name, a.email AS accepted_by_email,
           p.created_at, p.updated_at
    FROM problems p
    JOIN authority_domains d ON d.id = p.domain_id
    JOIN students s ON s.id = p.student_id
    LEFT JOIN authorities a ON a.id = p.accepted_by
"#;

pub const NOT_IN_DOMAIN: &str = "This complaint is not in your domain";
pub const ONLY_ACCEPTOR_TRANSFER: &str = "Only the accepting authority can transfer this complaint";
pub const ONLY_ACCEPTOR_UPDATE: &str = "Only the accepting authority can update this complaint";

fn complaint_not_found() -> AppError {
    AppError::not_found(anyhow!("Complaint not found"))
}

pub struct ProblemService;

impl ProblemService {
    /// Files a complaint and records the domain on the student's profile.
    #[instrument(skip(db, problem), fields(domain.id = %problem.domain_id, db.operation = "INSERT", db.table = "problems"))]
    pub async fn create(
        db: &PgPool,
        student_id: Uuid,
        problem: NewProblem,
    ) -> Result<Problem, AppError> {
        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let domain_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM authority_domains WHERE id = $1)",
        )
        .bind(problem.domain_id)
        .fetch_one(&mut *tx)
        .await?;

        if !domain_exists {
            return Err(AppError::not_found(anyhow!("Domain not found")));
        }

        let problem_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO problems (title, description, image, department, domain_id, priority, student_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&problem.title)
        .bind(&problem.description)
        .bind(&problem.image)
        .bind(&problem.department)
        .bind(problem.domain_id)
        .bind(problem.priority)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE students SET domain_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(problem.domain_id)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        track_complaint_filed();
        info!(problem.id = %problem_id, student.id = %student_id, "Complaint filed");
        Self::get_problem(db, problem_id).await
    }

    #[instrument(skip(db))]
    pub async fn get_problem(db: &PgPool, problem_id: Uuid) -> Result<Problem, AppError> {
        sqlx::query_as::<_, Problem>(&format!("{PROBLEM_SELECT} WHERE p.id = $1"))
            .bind(problem_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(complaint_not_found)
    }

    /// The domain of the student's most recent complaint.
    #[instrument(skip(db))]
    pub async fn student_domain(db: &PgPool, student_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let domain_id = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT domain_id FROM students WHERE id = $1",
        )
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;
        Ok(domain_id)
    }

    #[instrument(skip(db))]
    pub async fn list_all(db: &PgPool) -> Result<Vec<Problem>, AppError> {
        let problems =
            sqlx::query_as::<_, Problem>(&format!("{PROBLEM_SELECT} ORDER BY p.created_at DESC"))
                .fetch_all(db)
                .await?;
        Ok(problems)
    }

    #[instrument(skip(db))]
    pub async fn list_for_student(db: &PgPool, student_id: Uuid) -> Result<Vec<Problem>, AppError> {
        let problems = sqlx::query_as::<_, Problem>(&format!(
            "{PROBLEM_SELECT} WHERE p.student_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;
        Ok(problems)
    }

    #[instrument(skip(db))]
    pub async fn list_for_domain(db: &PgPool, domain_id: Uuid) -> Result<Vec<Problem>, AppError> {
        let problems = sqlx::query_as::<_, Problem>(&format!(
            "{PROBLEM_SELECT} WHERE p.domain_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(domain_id)
        .fetch_all(db)
        .await?;
        Ok(problems)
    }

    /// Complaints in the domain that are open to `authority_id`: unaccepted
    /// or already accepted by them.
    #[instrument(skip(db))]
    pub async fn list_open_to_authority(
        db: &PgPool,
        domain_id: Uuid,
        authority_id: Uuid,
    ) -> Result<Vec<Problem>, AppError> {
        let problems = sqlx::query_as::<_, Problem>(&format!(
            r#"{PROBLEM_SELECT}
            WHERE p.domain_id = $1 AND (p.accepted_by IS NULL OR p.accepted_by = $2)
            ORDER BY p.created_at DESC"#
        ))
        .bind(domain_id)
        .bind(authority_id)
        .fetch_all(db)
        .await?;
        Ok(problems)
    }

    #[instrument(skip(db))]
    pub async fn list_accepted_by(db: &PgPool, authority_id: Uuid) -> Result<Vec<Problem>, AppError> {
        let problems = sqlx::query_as::<_, Problem>(&format!(
            "{PROBLEM_SELECT} WHERE p.accepted_by = $1 ORDER BY p.updated_at DESC"
        ))
        .bind(authority_id)
        .fetch_all(db)
        .await?;
        Ok(problems)
    }

    /// Owner-only edit of the descriptive fields.
    #[instrument(skip(db, dto))]
    pub async fn update_own(
        db: &PgPool,
        problem_id: Uuid,
        student_id: Uuid,
        dto: UpdateProblemDto,
    ) -> Result<Problem, AppError> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT student_id FROM problems WHERE id = $1")
            .bind(problem_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(complaint_not_found)?;

        if owner != student_id {
            warn!(problem.id = %problem_id, student.id = %student_id, "Complaint update by non-owner");
            return Err(AppError::forbidden("Forbidden"));
        }

        sqlx::query(
            r#"
            UPDATE problems
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                department = COALESCE($4, department),
                priority = COALESCE($5, priority),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(problem_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.department)
        .bind(dto.priority)
        .execute(db)
        .await?;

        Self::get_problem(db, problem_id).await
    }

    /// Claims the complaint for `authority_id` and moves it to `progress`.
    /// Re-accepting one's own complaint is a no-op success.
    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "problems"))]
    pub async fn accept(
        db: &PgPool,
        problem_id: Uuid,
        authority_id: Uuid,
        domain_id: Uuid,
    ) -> Result<Problem, AppError> {
        let problem = Self::get_problem(db, problem_id).await?;
        if problem.domain_id != domain_id {
            return Err(AppError::forbidden(NOT_IN_DOMAIN));
        }

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE problems
            SET accepted_by = $2, status = 'progress', updated_at = NOW()
            WHERE id = $1 AND (accepted_by IS NULL OR accepted_by = $2)
            RETURNING id
            "#,
        )
        .bind(problem_id)
        .bind(authority_id)
        .fetch_optional(db)
        .await?;

        if updated.is_none() {
            return Err(AppError::bad_request(anyhow!(
                "Complaint already accepted by someone else"
            )));
        }

        track_complaint_transition("progress");
        info!(problem.id = %problem_id, authority.id = %authority_id, "Complaint accepted");
        Self::get_problem(db, problem_id).await
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "problems"))]
    pub async fn transfer(
        db: &PgPool,
        problem_id: Uuid,
        authority_id: Uuid,
        target_id: Uuid,
    ) -> Result<Problem, AppError> {
        let problem = Self::get_problem(db, problem_id).await?;
        if problem.accepted_by != Some(authority_id) {
            return Err(AppError::forbidden(ONLY_ACCEPTOR_TRANSFER));
        }

        let target_domain = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT domain_id FROM authorities WHERE id = $1",
        )
        .bind(target_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Target authority not found")))?;

        if target_domain != Some(problem.domain_id) {
            return Err(AppError::bad_request(anyhow!(
                "Target authority is not in the same domain"
            )));
        }

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE problems
            SET accepted_by = $3, updated_at = NOW()
            WHERE id = $1 AND accepted_by = $2
            RETURNING id
            "#,
        )
        .bind(problem_id)
        .bind(authority_id)
        .bind(target_id)
        .fetch_optional(db)
        .await?;

        if updated.is_none() {
            return Err(AppError::forbidden(ONLY_ACCEPTOR_TRANSFER));
        }

        info!(problem.id = %problem_id, from = %authority_id, to = %target_id, "Complaint transferred");
        Self::get_problem(db, problem_id).await
    }

    /// Sets the status and records the acceptor's comment atomically.
    #[instrument(skip(db, comment), fields(status = ?status))]
    pub async fn update_status(
        db: &PgPool,
        problem_id: Uuid,
        authority_id: Uuid,
        status: ProblemStatus,
        comment: &str,
    ) -> Result<ProblemWithComments, AppError> {
        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE problems
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND accepted_by = $2
            RETURNING id
            "#,
        )
        .bind(problem_id)
        .bind(authority_id)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM problems WHERE id = $1)",
            )
            .bind(problem_id)
            .fetch_one(&mut *tx)
            .await?;
            return Err(if exists {
                AppError::forbidden(ONLY_ACCEPTOR_UPDATE)
            } else {
                complaint_not_found()
            });
        }

        sqlx::query(
            "INSERT INTO problem_comments (problem_id, authority_id, text) VALUES ($1, $2, $3)",
        )
        .bind(problem_id)
        .bind(authority_id)
        .bind(comment)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        track_complaint_transition(match status {
            ProblemStatus::New => "new",
            ProblemStatus::Progress => "progress",
            ProblemStatus::Resolved => "resolved",
        });
        info!(problem.id = %problem_id, "Complaint status updated");

        let problem = Self::get_problem(db, problem_id).await?;
        let comments = Self::comments(db, problem_id).await?;
        Ok(ProblemWithComments { problem, comments })
    }

    #[instrument(skip(db))]
    pub async fn comments(db: &PgPool, problem_id: Uuid) -> Result<Vec<ProblemComment>, AppError> {
        let comments = sqlx::query_as::<_, ProblemComment>(
            r#"
            SELECT c.id, c.problem_id, c.authority_id, a.name AS authority_name, c.text, c.created_at
            FROM problem_comments c
            LEFT JOIN authorities a ON a.id = c.authority_id
            WHERE c.problem_id = $1
            ORDER BY c.created_at
            "#,
        )
        .bind(problem_id)
        .fetch_all(db)
        .await?;
        Ok(comments)
    }

    #[instrument(skip(db))]
    pub async fn domain_counts(db: &PgPool, domain_id: Uuid) -> Result<DomainProblemCounts, AppError> {
        let counts = sqlx::query_as::<_, DomainProblemCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'new' AND accepted_by IS NULL) AS pending,
                   COUNT(*) FILTER (WHERE status = 'progress') AS in_progress,
                   COUNT(*) FILTER (WHERE status = 'resolved') AS resolved,
                   COUNT(*) FILTER (WHERE priority = 'high' AND status <> 'resolved') AS high_priority
            FROM problems
            WHERE domain_id = $1
            "#,
        )
        .bind(domain_id)
        .fetch_one(db)
        .await?;
        Ok(counts)
    }

    #[instrument(skip(db))]
    pub async fn personal_counts(
        db: &PgPool,
        authority_id: Uuid,
    ) -> Result<PersonalProblemCounts, AppError> {
        let counts = sqlx::query_as::<_, PersonalProblemCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'progress') AS in_progress,
                   COUNT(*) FILTER (WHERE status = 'resolved') AS resolved
            FROM problems
            WHERE accepted_by = $1
            "#,
        )
        .bind(authority_id)
        .fetch_one(db)
        .await?;
        Ok(counts)
    }
}
