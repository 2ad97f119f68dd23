use std::collections::HashSet;

use anyhow::anyhow;
use campusdesk_core::{AppError, default_password_for, hash_password};
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::metrics::track_account_created;
use crate::modules::auth::service::normalize_email;

use super::model::{
    Authority, BulkImportResult, CreateAuthorityDto, CreateFacultyDto, CreateStudentDto, Faculty,
    ImportError, ImportRow, RecentClass, Student, WorkReport, WorkReportCounts,
};

pub struct AdminService;

const AUTHORITY_SELECT: &str = r#"
    SELECT a.id, a.name, a.email, a.department, a.domain_id, d.name AS domain_name, a.created_at
    FROM authorities a
    LEFT JOIN authority_domains d ON d.id = a.domain_id
"#;

const STUDENT_COLUMNS: &str = "id, name, enrollment_no, email, class_id, domain_id, created_at";

fn unique_violation(e: sqlx::Error, message: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow!(message));
    }
    error!(error = %e, "Database error creating account");
    AppError::from(e)
}

/// The row's own name, or the local part of its email when blank.
pub fn import_name(row: &ImportRow) -> String {
    row.name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| row.email.split('@').next().unwrap_or_default().to_string())
}

/// Splits sheet rows into first occurrences and in-file repeats. Kept rows
/// hold the email as entered; repeats are matched case-insensitively.
pub fn dedupe_rows(rows: Vec<ImportRow>) -> (Vec<ImportRow>, Vec<ImportError>) {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut errors = Vec::new();

    for mut row in rows {
        row.email = row.email.trim().to_string();
        let key = normalize_email(&row.email);
        if seen.insert(key.clone()) {
            unique.push(row);
        } else {
            errors.push(ImportError {
                email: key,
                error: "Duplicate email in file".to_string(),
            });
        }
    }

    (unique, errors)
}

impl AdminService {
    #[instrument(skip(db, dto), fields(faculty.email = %dto.email, db.operation = "INSERT", db.table = "faculty"))]
    pub async fn create_faculty(db: &PgPool, dto: CreateFacultyDto) -> Result<Faculty, AppError> {
        let email = normalize_email(&dto.email);
        let hashed = hash_password(&default_password_for(dto.email.trim()))?;

        let faculty = sqlx::query_as::<_, Faculty>(
            r#"
            INSERT INTO faculty (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(&email)
        .bind(hashed)
        .fetch_one(db)
        .await
        .map_err(|e| unique_violation(e, "Faculty already exists"))?;

        track_account_created("Faculty", 1);
        info!(faculty.id = %faculty.id, "Faculty created");
        Ok(faculty)
    }

    #[instrument(skip(db))]
    pub async fn list_faculty(db: &PgPool) -> Result<Vec<Faculty>, AppError> {
        let faculty = sqlx::query_as::<_, Faculty>(
            "SELECT id, name, email, created_at FROM faculty ORDER BY created_at DESC",
        )
        .fetch_all(db)
        .await?;
        Ok(faculty)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "faculty"))]
    pub async fn delete_faculty(db: &PgPool, faculty_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
            .bind(faculty_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Faculty not found")));
        }

        info!(faculty.id = %faculty_id, "Faculty deleted");
        Ok(())
    }

    /// Creates a student with a derived password and, when a class is given,
    /// enrolls them in it.
    #[instrument(skip(db, dto), fields(student.email = %dto.email, db.operation = "INSERT", db.table = "students"))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let email = normalize_email(&dto.email);
        let hashed = hash_password(&default_password_for(dto.email.trim()))?;

        if let Some(class_id) = dto.class_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)",
            )
            .bind(class_id)
            .fetch_one(db)
            .await?;
            if !exists {
                return Err(AppError::not_found(anyhow!("Class not found")));
            }
        }

        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let sql = format!(
            "INSERT INTO students (name, email, password, enrollment_no, class_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            STUDENT_COLUMNS
        );
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(dto.name.as_deref().map(str::trim))
            .bind(&email)
            .bind(hashed)
            .bind(&dto.enrollment_no)
            .bind(dto.class_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| unique_violation(e, "Student already exists"))?;

        if let Some(class_id) = dto.class_id {
            sqlx::query("INSERT INTO class_enrollments (class_id, student_id) VALUES ($1, $2)")
                .bind(class_id)
                .bind(student.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        track_account_created("Student", 1);
        info!(student.id = %student.id, "Student created");
        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn list_students(db: &PgPool) -> Result<Vec<Student>, AppError> {
        let sql = format!(
            "SELECT {} FROM students ORDER BY created_at DESC",
            STUDENT_COLUMNS
        );
        let students = sqlx::query_as::<_, Student>(&sql).fetch_all(db).await?;
        Ok(students)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "students"))]
    pub async fn delete_student(db: &PgPool, student_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(student_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        info!(student.id = %student_id, "Student deleted");
        Ok(())
    }

    /// Creates one student per new email. Existing emails and in-file repeats
    /// are reported per row and skipped.
    #[instrument(skip(db, rows), fields(rows = rows.len()))]
    pub async fn bulk_create_students(
        db: &PgPool,
        rows: Vec<ImportRow>,
    ) -> Result<BulkImportResult, AppError> {
        let (rows, mut errors) = dedupe_rows(rows);

        let emails: Vec<String> = rows.iter().map(|r| normalize_email(&r.email)).collect();
        let existing: HashSet<String> = sqlx::query_scalar::<_, String>(
            "SELECT email FROM students WHERE email = ANY($1)",
        )
        .bind(&emails)
        .fetch_all(db)
        .await?
        .into_iter()
        .collect();

        let mut tx: Transaction<'_, Postgres> = db.begin().await?;
        let mut created_count = 0usize;

        for row in rows {
            let email = normalize_email(&row.email);
            if existing.contains(&email) {
                errors.push(ImportError {
                    email,
                    error: "Student already exists".to_string(),
                });
                continue;
            }

            let hashed = hash_password(&default_password_for(&row.email))?;
            sqlx::query("INSERT INTO students (name, email, password) VALUES ($1, $2, $3)")
                .bind(import_name(&row))
                .bind(&email)
                .bind(hashed)
                .execute(&mut *tx)
                .await?;
            created_count += 1;
        }

        tx.commit().await?;

        if !errors.is_empty() {
            warn!(skipped = errors.len(), "Some import rows were skipped");
        }
        track_account_created("Student", created_count as u64);
        info!(created = created_count, "Bulk student import finished");

        Ok(BulkImportResult {
            created_count,
            errors,
        })
    }

    #[instrument(skip(db, dto), fields(authority.email = %dto.email, db.operation = "INSERT", db.table = "authorities"))]
    pub async fn create_authority(db: &PgPool, dto: CreateAuthorityDto) -> Result<Authority, AppError> {
        if let Some(domain_id) = dto.domain_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM authority_domains WHERE id = $1)",
            )
            .bind(domain_id)
            .fetch_one(db)
            .await?;
            if !exists {
                return Err(AppError::not_found(anyhow!("Domain not found")));
            }
        }

        let hashed = hash_password(&dto.password)?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO authorities (name, email, password, department, domain_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(dto.name.trim())
        .bind(normalize_email(&dto.email))
        .bind(hashed)
        .bind(&dto.department)
        .bind(dto.domain_id)
        .fetch_one(db)
        .await
        .map_err(|e| unique_violation(e, "Authority already exists"))?;

        track_account_created("Authority", 1);
        info!(authority.id = %id, "Authority created");
        Self::get_authority(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_authority(db: &PgPool, authority_id: Uuid) -> Result<Authority, AppError> {
        let sql = format!("{} WHERE a.id = $1", AUTHORITY_SELECT);
        sqlx::query_as::<_, Authority>(&sql)
            .bind(authority_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Authority not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_authorities(db: &PgPool) -> Result<Vec<Authority>, AppError> {
        let sql = format!("{} ORDER BY a.created_at DESC", AUTHORITY_SELECT);
        let authorities = sqlx::query_as::<_, Authority>(&sql).fetch_all(db).await?;
        Ok(authorities)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "authorities"))]
    pub async fn delete_authority(db: &PgPool, authority_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM authorities WHERE id = $1")
            .bind(authority_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Authority not found")));
        }

        info!(authority.id = %authority_id, "Authority deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn work_report(db: &PgPool) -> Result<WorkReport, AppError> {
        let counts = sqlx::query_as::<_, WorkReportCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM classes) AS total_classes,
                (SELECT COUNT(*) FROM students) AS total_students,
                (SELECT COUNT(*) FROM faculty) AS total_faculty,
                (SELECT COUNT(*) FROM authorities) AS total_authorities,
                (SELECT COUNT(*) FROM classes WHERE teacher_id IS NULL) AS classes_without_teacher,
                (SELECT COUNT(*) FROM classes c
                  WHERE NOT EXISTS (SELECT 1 FROM class_enrollments e WHERE e.class_id = c.id)
                ) AS classes_without_students
            "#,
        )
        .fetch_one(db)
        .await?;

        let recent_classes = sqlx::query_as::<_, RecentClass>(
            r#"
            SELECT c.id, c.name, f.name AS teacher_name, c.created_at
            FROM classes c
            LEFT JOIN faculty f ON f.id = c.teacher_id
            WHERE c.created_at >= NOW() - INTERVAL '7 days'
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;

        debug!(recent = recent_classes.len(), "Work report assembled");

        Ok(WorkReport {
            counts,
            recent_classes,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: Option<&str>, email: &str) -> ImportRow {
        ImportRow {
            name: name.map(str::to_string),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_import_name_falls_back_to_email_prefix() {
        assert_eq!(import_name(&row(Some("Ada"), "ada@campus.edu")), "Ada");
        assert_eq!(import_name(&row(Some("  "), "grace@campus.edu")), "grace");
        assert_eq!(import_name(&row(None, "linus@campus.edu")), "linus");
    }

    #[test]
    fn test_dedupe_rows_reports_repeats() {
        let (unique, errors) = dedupe_rows(vec![
            row(None, "a@campus.edu"),
            row(None, "B@campus.edu"),
            row(None, "A@Campus.edu"),
        ]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[1].email, "B@campus.edu");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].email, "a@campus.edu");
    }
}
