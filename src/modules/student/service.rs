use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use super::model::{StudentProfile, UpdateStudentProfileDto};

const PROFILE_SELECT: &str = r#"
    SELECT s.id, s.name, s.enrollment_no, s.email, s.class_id,
           c.name AS class_name, s.domain_id, s.created_at
    FROM students s
    LEFT JOIN classes c ON c.id = s.class_id
    WHERE s.id = $1
"#;

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, student_id: Uuid) -> Result<StudentProfile, AppError> {
        sqlx::query_as::<_, StudentProfile>(PROFILE_SELECT)
            .bind(student_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "students"))]
    pub async fn update_profile(
        db: &PgPool,
        student_id: Uuid,
        dto: UpdateStudentProfileDto,
    ) -> Result<StudentProfile, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET name = COALESCE($2, name),
                enrollment_no = COALESCE($3, enrollment_no),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(student_id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.enrollment_no.as_deref().map(str::trim))
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        info!(student.id = %student_id, "Student profile updated");
        Self::get_profile(db, student_id).await
    }
}
