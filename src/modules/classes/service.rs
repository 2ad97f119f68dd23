use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use campusdesk_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::model::{
    AttendanceEntry, AttendanceSession, AuthorType, ClassRecord, ClassSummary, ClassWithStudents,
    BulkGradesDto, CreateClassDto, CreateGradeDto, Discussion, FacultyClassView, Grade, Lecture, NewGrade, Note, PastPaper, Reply,
    StudentAttendance, StudentBrief, StudentClassView,
};

pub struct ClassService;

fn missing_grade_fields() -> AppError {
    AppError::bad_request(anyhow!("All required fields must be provided"))
}

pub fn grade_from_dto(dto: CreateGradeDto) -> Result<NewGrade, AppError> {
    let (Some(student_id), Some(title), Some(marks), Some(max_marks), Some(grade_type)) = (
        dto.student_id,
        dto.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        dto.marks,
        dto.max_marks,
        dto.grade_type,
    ) else {
        return Err(missing_grade_fields());
    };

    Ok(NewGrade {
        student_id,
        title,
        marks,
        max_marks,
        grade_type,
        remarks: dto.remarks,
    })
}

/// Expands a bulk body into one grade per entry. Entry remarks override the
/// shared remarks.
pub fn grades_from_bulk(dto: BulkGradesDto) -> Result<Vec<NewGrade>, AppError> {
    let (Some(title), Some(max_marks), Some(grade_type)) = (
        dto.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        dto.max_marks,
        dto.grade_type,
    ) else {
        return Err(missing_grade_fields());
    };

    if dto.grades.is_empty() {
        return Err(missing_grade_fields());
    }

    Ok(dto
        .grades
        .into_iter()
        .map(|entry| NewGrade {
            student_id: entry.student_id,
            title: title.clone(),
            marks: entry.marks,
            max_marks,
            grade_type,
            remarks: entry.remarks.or_else(|| dto.remarks.clone()),
        })
        .collect())
}

const CLASS_SUMMARY_SELECT: &str = r#"
    SELECT c.id, c.name, c.teacher_id,
           f.name AS teacher_name, f.email AS teacher_email,
           (SELECT COUNT(*) FROM class_enrollments e WHERE e.class_id = c.id) AS student_count,
           c.created_at
    FROM classes c
    LEFT JOIN faculty f ON f.id = c.teacher_id
"#;

const LECTURE_COLUMNS: &str =
    "id, class_id, title, description, scheduled_date, duration, status, created_by, created_at";

const GRADE_SELECT: &str = r#"
    SELECT g.id, g.class_id, g.student_id, s.name AS student_name, s.email AS student_email,
           g.title, g.marks, g.max_marks, g.grade_type, g.date, g.remarks, g.entered_by,
           g.created_at
    FROM grades g
    JOIN students s ON s.id = g.student_id
"#;

/// Columns resolving `{alias}.author_type`/`{alias}.author_id` into an `AuthorRef`.
fn author_columns(alias: &str) -> String {
    format!(
        "{a}.author_id, {a}.author_type, \
         COALESCE(sa.name, fa.name) AS author_name, \
         COALESCE(sa.email, fa.email) AS author_email",
        a = alias
    )
}

fn author_joins(alias: &str) -> String {
    format!(
        "LEFT JOIN students sa ON {a}.author_type = 'Student' AND sa.id = {a}.author_id \
         LEFT JOIN faculty fa ON {a}.author_type = 'Faculty' AND fa.id = {a}.author_id",
        a = alias
    )
}

fn note_select(source: &str) -> String {
    format!(
        "SELECT n.id, n.class_id, n.title, n.description, n.drive_link, {}, n.created_at \
         FROM {} n {}",
        author_columns("n"),
        source,
        author_joins("n")
    )
}

fn past_paper_select(source: &str) -> String {
    format!(
        "SELECT p.id, p.class_id, p.title, p.year, p.semester, p.drive_link, {}, p.created_at \
         FROM {} p {}",
        author_columns("p"),
        source,
        author_joins("p")
    )
}

fn discussion_select(source: &str) -> String {
    format!(
        "SELECT d.id, d.class_id, d.message, {}, d.created_at FROM {} d {}",
        author_columns("d"),
        source,
        author_joins("d")
    )
}

fn reply_select(source: &str) -> String {
    format!(
        "SELECT r.id, r.discussion_id, r.message, {}, r.created_at FROM {} r {}",
        author_columns("r"),
        source,
        author_joins("r")
    )
}

/// Runs `insert` and reads the new row back through `select`, which must
/// read from `inserted`.
fn with_inserted(insert: &str, select: &str) -> String {
    format!("WITH inserted AS ({}) {}", insert, select)
}

fn class_not_found() -> AppError {
    AppError::not_found(anyhow!("Class not found"))
}

/// Splits attendance rows into sessions with present and absent lists.
fn attach_entries(sessions: &mut [AttendanceSession], entries: Vec<AttendanceEntry>) {
    let mut by_session: HashMap<Uuid, Vec<AttendanceEntry>> = HashMap::new();
    for entry in entries {
        by_session.entry(entry.attendance_id).or_default().push(entry);
    }

    for session in sessions.iter_mut() {
        for entry in by_session.remove(&session.id).unwrap_or_default() {
            if entry.present {
                session.present_students.push(entry.student);
            } else {
                session.absent_students.push(entry.student);
            }
        }
    }
}

fn attach_replies(discussions: &mut [Discussion], replies: Vec<Reply>) {
    let mut by_discussion: HashMap<Uuid, Vec<Reply>> = HashMap::new();
    for reply in replies {
        by_discussion
            .entry(reply.discussion_id)
            .or_default()
            .push(reply);
    }

    for discussion in discussions.iter_mut() {
        discussion.replies = by_discussion.remove(&discussion.id).unwrap_or_default();
    }
}

/// Enrolled students not marked present, in enrollment order.
pub fn absent_students(enrolled: &[Uuid], present: &HashSet<Uuid>) -> Vec<Uuid> {
    enrolled
        .iter()
        .filter(|id| !present.contains(id))
        .copied()
        .collect()
}

impl ClassService {
    #[instrument(skip(db, dto), fields(class.name = %dto.name, db.operation = "INSERT", db.table = "classes"))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<ClassRecord, AppError> {
        let teacher_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM faculty WHERE id = $1)")
                .bind(dto.teacher_id)
                .fetch_one(db)
                .await?;

        if !teacher_exists {
            debug!(teacher.id = %dto.teacher_id, "Teacher not found");
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        let class = sqlx::query_as::<_, ClassRecord>(
            r#"
            INSERT INTO classes (name, teacher_id)
            VALUES ($1, $2)
            RETURNING id, name, teacher_id, created_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(dto.teacher_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            // Teacher deleted between the check and the insert.
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow!("Teacher not found"));
            }
            error!(error = %e, "Database error creating class");
            AppError::from(e)
        })?;

        info!(class.id = %class.id, "Class created");
        Ok(class)
    }

    #[instrument(skip(db))]
    pub async fn list_classes(db: &PgPool) -> Result<Vec<ClassSummary>, AppError> {
        let sql = format!("{} ORDER BY c.created_at DESC", CLASS_SUMMARY_SELECT);
        let classes = sqlx::query_as::<_, ClassSummary>(&sql).fetch_all(db).await?;
        Ok(classes)
    }

    #[instrument(skip(db))]
    pub async fn get_class(db: &PgPool, class_id: Uuid) -> Result<ClassSummary, AppError> {
        let sql = format!("{} WHERE c.id = $1", CLASS_SUMMARY_SELECT);
        sqlx::query_as::<_, ClassSummary>(&sql)
            .bind(class_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(class_not_found)
    }

    async fn ensure_class_exists(db: &PgPool, class_id: Uuid) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
                .bind(class_id)
                .fetch_one(db)
                .await?;
        if exists { Ok(()) } else { Err(class_not_found()) }
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "classes"))]
    pub async fn delete_class(db: &PgPool, class_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(class_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(class_not_found());
        }

        info!(class.id = %class_id, "Class deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn enrolled_students(db: &PgPool, class_id: Uuid) -> Result<Vec<StudentBrief>, AppError> {
        let students = sqlx::query_as::<_, StudentBrief>(
            r#"
            SELECT s.id, s.name, s.email, s.enrollment_no
            FROM class_enrollments e
            JOIN students s ON s.id = e.student_id
            WHERE e.class_id = $1
            ORDER BY e.enrolled_at
            "#,
        )
        .bind(class_id)
        .fetch_all(db)
        .await?;
        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn classes_for_teacher(
        db: &PgPool,
        faculty_id: Uuid,
    ) -> Result<Vec<ClassWithStudents>, AppError> {
        let sql = format!(
            "{} WHERE c.teacher_id = $1 ORDER BY c.created_at DESC",
            CLASS_SUMMARY_SELECT
        );
        let classes = sqlx::query_as::<_, ClassSummary>(&sql)
            .bind(faculty_id)
            .fetch_all(db)
            .await?;

        let mut result = Vec::with_capacity(classes.len());
        for class in classes {
            let students = Self::enrolled_students(db, class.id).await?;
            result.push(ClassWithStudents { class, students });
        }
        Ok(result)
    }

    /// Adds the student to the class roster and makes it their current class.
    #[instrument(skip(db))]
    pub async fn enroll(db: &PgPool, student_id: Uuid, class_id: Uuid) -> Result<ClassSummary, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO class_enrollments (class_id, student_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!("Already enrolled in this class")));
        }

        sqlx::query("UPDATE students SET class_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(class_id)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(student.id = %student_id, class.id = %class_id, "Student enrolled");
        Self::get_class(db, class_id).await
    }

    #[instrument(skip(db, title, description))]
    pub async fn add_lecture(
        db: &PgPool,
        class_id: Uuid,
        faculty_id: Uuid,
        title: String,
        scheduled_date: DateTime<Utc>,
        description: Option<String>,
        duration: Option<i32>,
    ) -> Result<Lecture, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        let sql = format!(
            "INSERT INTO lectures (class_id, title, description, scheduled_date, duration, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            LECTURE_COLUMNS
        );
        let lecture = sqlx::query_as::<_, Lecture>(&sql)
            .bind(class_id)
            .bind(title)
            .bind(description)
            .bind(scheduled_date)
            .bind(duration.unwrap_or(60))
            .bind(faculty_id)
            .fetch_one(db)
            .await?;

        info!(lecture.id = %lecture.id, "Lecture added");
        Ok(lecture)
    }

    /// Records one session: every listed student present, every other
    /// enrolled student absent.
    #[instrument(skip(db, present_students))]
    pub async fn mark_attendance(
        db: &PgPool,
        class_id: Uuid,
        faculty_id: Uuid,
        present_students: Vec<Uuid>,
        date: Option<DateTime<Utc>>,
        lecture_id: Option<Uuid>,
    ) -> Result<AttendanceSession, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        let enrolled = sqlx::query_scalar::<_, Uuid>(
            "SELECT student_id FROM class_enrollments WHERE class_id = $1 ORDER BY enrolled_at",
        )
        .bind(class_id)
        .fetch_all(db)
        .await?;

        let mut seen = HashSet::new();
        let present: Vec<Uuid> = present_students
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        let absent = absent_students(&enrolled, &seen);

        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let mut session = sqlx::query_as::<_, AttendanceSession>(
            r#"
            INSERT INTO attendance (class_id, lecture_id, date, marked_by)
            VALUES ($1, $2, COALESCE($3, NOW()), $4)
            RETURNING id, class_id, lecture_id, date, marked_by
            "#,
        )
        .bind(class_id)
        .bind(lecture_id)
        .bind(date)
        .bind(faculty_id)
        .fetch_one(&mut *tx)
        .await?;

        for (student_id, is_present) in present
            .iter()
            .map(|id| (*id, true))
            .chain(absent.iter().map(|id| (*id, false)))
        {
            sqlx::query(
                "INSERT INTO attendance_entries (attendance_id, student_id, present) VALUES ($1, $2, $3)",
            )
            .bind(session.id)
            .bind(student_id)
            .bind(is_present)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::not_found(anyhow!("Student not found"));
                }
                AppError::from(e)
            })?;
        }

        tx.commit().await?;

        let entries = Self::attendance_entries(db, "a.id = $1", session.id).await?;
        attach_entries(std::slice::from_mut(&mut session), entries);

        info!(
            attendance.id = %session.id,
            present = session.present_students.len(),
            absent = session.absent_students.len(),
            "Attendance marked"
        );
        Ok(session)
    }

    async fn attendance_entries(
        db: &PgPool,
        filter: &str,
        id: Uuid,
    ) -> Result<Vec<AttendanceEntry>, AppError> {
        let sql = format!(
            "SELECT e.attendance_id, e.present, s.id, s.name, s.email, s.enrollment_no \
             FROM attendance_entries e \
             JOIN attendance a ON a.id = e.attendance_id \
             JOIN students s ON s.id = e.student_id \
             WHERE {} ORDER BY s.name NULLS LAST, s.email",
            filter
        );
        let entries = sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(id)
            .fetch_all(db)
            .await?;
        Ok(entries)
    }

    /// Inserts grades in one transaction. An unknown student aborts the batch.
    #[instrument(skip(db, grades), fields(count = grades.len()))]
    pub async fn add_grades(
        db: &PgPool,
        class_id: Uuid,
        faculty_id: Uuid,
        grades: Vec<NewGrade>,
    ) -> Result<Vec<Grade>, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        if grades.iter().any(|g| !g.is_within_bounds()) {
            return Err(AppError::bad_request(anyhow!(
                "Marks must be between 0 and max marks"
            )));
        }

        let sql = with_inserted(
            "INSERT INTO grades (class_id, student_id, title, marks, max_marks, grade_type, remarks, entered_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
            &GRADE_SELECT.replace("FROM grades g", "FROM inserted g"),
        );

        let mut tx: Transaction<'_, Postgres> = db.begin().await?;
        let mut created = Vec::with_capacity(grades.len());

        for grade in grades {
            let row = sqlx::query_as::<_, Grade>(&sql)
                .bind(class_id)
                .bind(grade.student_id)
                .bind(&grade.title)
                .bind(grade.marks)
                .bind(grade.max_marks)
                .bind(grade.grade_type)
                .bind(&grade.remarks)
                .bind(faculty_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(db_err) = &e
                        && db_err.is_foreign_key_violation()
                    {
                        return AppError::not_found(anyhow!("Student not found"));
                    }
                    error!(error = %e, "Database error adding grade");
                    AppError::from(e)
                })?;
            created.push(row);
        }

        tx.commit().await?;

        info!(class.id = %class_id, count = created.len(), "Grades added");
        Ok(created)
    }

    #[instrument(skip(db, title, drive_link, description))]
    pub async fn add_note(
        db: &PgPool,
        class_id: Uuid,
        author_type: AuthorType,
        author_id: Uuid,
        title: String,
        drive_link: String,
        description: Option<String>,
    ) -> Result<Note, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        let sql = with_inserted(
            "INSERT INTO notes (class_id, title, description, drive_link, author_type, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
            &note_select("inserted"),
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(class_id)
            .bind(title)
            .bind(description)
            .bind(drive_link)
            .bind(author_type)
            .bind(author_id)
            .fetch_one(db)
            .await?;

        info!(note.id = %note.id, "Note added");
        Ok(note)
    }

    #[instrument(skip(db, title, drive_link, semester))]
    #[allow(clippy::too_many_arguments)]
    pub async fn add_past_paper(
        db: &PgPool,
        class_id: Uuid,
        author_type: AuthorType,
        author_id: Uuid,
        title: String,
        drive_link: String,
        year: Option<i32>,
        semester: Option<String>,
    ) -> Result<PastPaper, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        let sql = with_inserted(
            "INSERT INTO past_papers (class_id, title, year, semester, drive_link, author_type, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
            &past_paper_select("inserted"),
        );
        let paper = sqlx::query_as::<_, PastPaper>(&sql)
            .bind(class_id)
            .bind(title)
            .bind(year)
            .bind(semester)
            .bind(drive_link)
            .bind(author_type)
            .bind(author_id)
            .fetch_one(db)
            .await?;

        info!(past_paper.id = %paper.id, "Past paper added");
        Ok(paper)
    }

    #[instrument(skip(db, message))]
    pub async fn add_discussion(
        db: &PgPool,
        class_id: Uuid,
        author_type: AuthorType,
        author_id: Uuid,
        message: String,
    ) -> Result<Discussion, AppError> {
        Self::ensure_class_exists(db, class_id).await?;

        let sql = with_inserted(
            "INSERT INTO discussions (class_id, message, author_type, author_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
            &discussion_select("inserted"),
        );
        let discussion = sqlx::query_as::<_, Discussion>(&sql)
            .bind(class_id)
            .bind(message)
            .bind(author_type)
            .bind(author_id)
            .fetch_one(db)
            .await?;

        info!(discussion.id = %discussion.id, "Discussion created");
        Ok(discussion)
    }

    #[instrument(skip(db, message))]
    pub async fn add_reply(
        db: &PgPool,
        discussion_id: Uuid,
        author_type: AuthorType,
        author_id: Uuid,
        message: String,
    ) -> Result<Reply, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM discussions WHERE id = $1)")
                .bind(discussion_id)
                .fetch_one(db)
                .await?;
        if !exists {
            return Err(AppError::not_found(anyhow!("Discussion not found")));
        }

        let sql = with_inserted(
            "INSERT INTO discussion_replies (discussion_id, message, author_type, author_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
            &reply_select("inserted"),
        );
        let reply = sqlx::query_as::<_, Reply>(&sql)
            .bind(discussion_id)
            .bind(message)
            .bind(author_type)
            .bind(author_id)
            .fetch_one(db)
            .await?;

        info!(reply.id = %reply.id, "Reply added");
        Ok(reply)
    }

    async fn notes(db: &PgPool, class_id: Uuid) -> Result<Vec<Note>, AppError> {
        let sql = format!("{} WHERE n.class_id = $1 ORDER BY n.created_at DESC", note_select("notes"));
        Ok(sqlx::query_as::<_, Note>(&sql).bind(class_id).fetch_all(db).await?)
    }

    async fn past_papers(db: &PgPool, class_id: Uuid) -> Result<Vec<PastPaper>, AppError> {
        let sql = format!(
            "{} WHERE p.class_id = $1 ORDER BY p.year DESC NULLS LAST, p.created_at DESC",
            past_paper_select("past_papers")
        );
        Ok(sqlx::query_as::<_, PastPaper>(&sql).bind(class_id).fetch_all(db).await?)
    }

    async fn discussions(db: &PgPool, class_id: Uuid) -> Result<Vec<Discussion>, AppError> {
        let sql = format!(
            "{} WHERE d.class_id = $1 ORDER BY d.created_at DESC",
            discussion_select("discussions")
        );
        let mut discussions = sqlx::query_as::<_, Discussion>(&sql)
            .bind(class_id)
            .fetch_all(db)
            .await?;

        let sql = format!(
            "{} JOIN discussions d ON d.id = r.discussion_id WHERE d.class_id = $1 ORDER BY r.created_at",
            reply_select("discussion_replies")
        );
        let replies = sqlx::query_as::<_, Reply>(&sql)
            .bind(class_id)
            .fetch_all(db)
            .await?;

        attach_replies(&mut discussions, replies);
        Ok(discussions)
    }

    #[instrument(skip(db))]
    pub async fn faculty_view(db: &PgPool, class_id: Uuid) -> Result<FacultyClassView, AppError> {
        let class = Self::get_class(db, class_id).await?;
        let students = Self::enrolled_students(db, class_id).await?;

        let sql = format!(
            "SELECT {} FROM lectures WHERE class_id = $1 ORDER BY scheduled_date DESC",
            LECTURE_COLUMNS
        );
        let lectures = sqlx::query_as::<_, Lecture>(&sql)
            .bind(class_id)
            .fetch_all(db)
            .await?;

        let mut attendance = sqlx::query_as::<_, AttendanceSession>(
            r#"
            SELECT id, class_id, lecture_id, date, marked_by
            FROM attendance
            WHERE class_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(class_id)
        .fetch_all(db)
        .await?;
        let entries = Self::attendance_entries(db, "a.class_id = $1", class_id).await?;
        attach_entries(&mut attendance, entries);

        let sql = format!("{} WHERE g.class_id = $1 ORDER BY g.date DESC", GRADE_SELECT);
        let grades = sqlx::query_as::<_, Grade>(&sql)
            .bind(class_id)
            .fetch_all(db)
            .await?;

        Ok(FacultyClassView {
            class,
            students,
            lectures,
            notes: Self::notes(db, class_id).await?,
            past_papers: Self::past_papers(db, class_id).await?,
            discussions: Self::discussions(db, class_id).await?,
            attendance,
            grades,
        })
    }

    /// Class view limited to upcoming lectures and the student's own records.
    #[instrument(skip(db))]
    pub async fn student_view(
        db: &PgPool,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<StudentClassView, AppError> {
        let class = Self::get_class(db, class_id).await?;

        let sql = format!(
            "SELECT {} FROM lectures WHERE class_id = $1 AND scheduled_date >= NOW() \
             ORDER BY scheduled_date ASC LIMIT 10",
            LECTURE_COLUMNS
        );
        let upcoming_lectures = sqlx::query_as::<_, Lecture>(&sql)
            .bind(class_id)
            .fetch_all(db)
            .await?;

        let attendance = sqlx::query_as::<_, StudentAttendance>(
            r#"
            SELECT a.id AS attendance_id, a.lecture_id, a.date, e.present
            FROM attendance a
            JOIN attendance_entries e ON e.attendance_id = a.id
            WHERE a.class_id = $1 AND e.student_id = $2
            ORDER BY a.date DESC
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_all(db)
        .await?;

        let sql = format!(
            "{} WHERE g.class_id = $1 AND g.student_id = $2 ORDER BY g.date DESC",
            GRADE_SELECT
        );
        let grades = sqlx::query_as::<_, Grade>(&sql)
            .bind(class_id)
            .bind(student_id)
            .fetch_all(db)
            .await?;

        Ok(StudentClassView {
            class,
            upcoming_lectures,
            notes: Self::notes(db, class_id).await?,
            past_papers: Self::past_papers(db, class_id).await?,
            discussions: Self::discussions(db, class_id).await?,
            attendance,
            grades,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::classes::model::{BulkGradeEntry, GradeType};

    #[test]
    fn test_absent_students_excludes_present() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let present: HashSet<Uuid> = [b].into_iter().collect();
        assert_eq!(absent_students(&[a, b, c], &present), vec![a, c]);
    }

    #[test]
    fn test_insert_reads_back_through_author_joins() {
        let sql = with_inserted(
            "INSERT INTO notes (title) VALUES ($1) RETURNING *",
            &note_select("inserted"),
        );
        assert!(sql.starts_with("WITH inserted AS (INSERT INTO notes"));
        assert!(sql.contains("FROM inserted n LEFT JOIN students sa ON n.author_type = 'Student'"));
        assert!(sql.contains("COALESCE(sa.email, fa.email) AS author_email"));
    }

    #[test]
    fn test_grade_from_dto_requires_all_fields() {
        let dto = CreateGradeDto {
            student_id: Some(Uuid::new_v4()),
            title: Some("Midterm".to_string()),
            marks: Some(40.0),
            max_marks: None,
            grade_type: Some(GradeType::Exam),
            remarks: None,
        };
        let err = grade_from_dto(dto).unwrap_err();
        assert_eq!(err.error.to_string(), "All required fields must be provided");
    }

    #[test]
    fn test_grades_from_bulk_shares_header_fields() {
        let first = Uuid::new_v4();
        let dto = BulkGradesDto {
            title: Some("Quiz 1".to_string()),
            max_marks: Some(10.0),
            grade_type: Some(GradeType::Quiz),
            remarks: Some("Week 3".to_string()),
            grades: vec![
                BulkGradeEntry {
                    student_id: first,
                    marks: 8.0,
                    remarks: None,
                },
                BulkGradeEntry {
                    student_id: Uuid::new_v4(),
                    marks: 6.5,
                    remarks: Some("Late".to_string()),
                },
            ],
        };
        let grades = grades_from_bulk(dto).unwrap();
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].student_id, first);
        assert_eq!(grades[0].title, "Quiz 1");
        assert_eq!(grades[0].remarks.as_deref(), Some("Week 3"));
        assert_eq!(grades[1].remarks.as_deref(), Some("Late"));
    }

    #[test]
    fn test_grades_from_bulk_rejects_empty_list() {
        let dto = BulkGradesDto {
            title: Some("Quiz 1".to_string()),
            max_marks: Some(10.0),
            grade_type: Some(GradeType::Quiz),
            remarks: None,
            grades: vec![],
        };
        assert!(grades_from_bulk(dto).is_err());
    }
}
