//! Classes and the academic records attached to them.
//!
//! Notes, past papers, discussions and replies can be written by either a
//! student or a faculty member. The writer is stored as an `author_type`
//! discriminator plus an id and resolved into an [`AuthorRef`] when read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "author_type")]
pub enum AuthorType {
    Student,
    Faculty,
}

/// Resolved author of a class post. `name`/`email` are `None` once the
/// account has been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorRef {
    #[sqlx(rename = "author_id")]
    pub id: Uuid,
    pub author_type: AuthorType,
    #[sqlx(rename = "author_name")]
    pub name: Option<String>,
    #[sqlx(rename = "author_email")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lecture_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LectureStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "grade_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GradeType {
    Exam,
    Assignment,
    Quiz,
    Project,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassRecord {
    pub id: Uuid,
    pub name: String,
    pub teacher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassSummary {
    pub id: Uuid,
    pub name: String,
    pub teacher_id: Option<Uuid>,
    pub teacher_name: Option<String>,
    pub teacher_email: Option<String>,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentBrief {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub enrollment_no: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassWithStudents {
    #[serde(flatten)]
    pub class: ClassSummary,
    pub students: Vec<StudentBrief>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lecture {
    pub id: Uuid,
    pub class_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub duration: i32,
    pub status: LectureStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub class_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub drive_link: String,
    #[sqlx(flatten)]
    pub uploaded_by: AuthorRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PastPaper {
    pub id: Uuid,
    pub class_id: Uuid,
    pub title: String,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub drive_link: String,
    #[sqlx(flatten)]
    pub uploaded_by: AuthorRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reply {
    pub id: Uuid,
    pub discussion_id: Uuid,
    pub message: String,
    #[sqlx(flatten)]
    pub author: AuthorRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Discussion {
    pub id: Uuid,
    pub class_id: Uuid,
    pub message: String,
    #[sqlx(flatten)]
    pub author: AuthorRef,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceSession {
    pub id: Uuid,
    pub class_id: Uuid,
    pub lecture_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub marked_by: Option<Uuid>,
    #[sqlx(skip)]
    pub present_students: Vec<StudentBrief>,
    #[sqlx(skip)]
    pub absent_students: Vec<StudentBrief>,
}

/// One student's line in an attendance session.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceEntry {
    pub attendance_id: Uuid,
    pub present: bool,
    #[sqlx(flatten)]
    pub student: StudentBrief,
}

/// A student's own view of one attendance session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentAttendance {
    pub attendance_id: Uuid,
    pub lecture_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: Uuid,
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: String,
    pub title: String,
    pub marks: f64,
    pub max_marks: f64,
    pub grade_type: GradeType,
    pub date: DateTime<Utc>,
    pub remarks: Option<String>,
    pub entered_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FacultyClassView {
    pub class: ClassSummary,
    pub students: Vec<StudentBrief>,
    pub lectures: Vec<Lecture>,
    pub notes: Vec<Note>,
    pub past_papers: Vec<PastPaper>,
    pub discussions: Vec<Discussion>,
    pub attendance: Vec<AttendanceSession>,
    pub grades: Vec<Grade>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentClassView {
    pub class: ClassSummary,
    pub upcoming_lectures: Vec<Lecture>,
    pub notes: Vec<Note>,
    pub past_papers: Vec<PastPaper>,
    pub discussions: Vec<Discussion>,
    pub attendance: Vec<StudentAttendance>,
    pub grades: Vec<Grade>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    pub teacher_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollClassDto {
    pub class_id: Option<Uuid>,
}

// Class record inputs keep their required fields optional so the handlers can
// report them together, e.g. "Title and scheduled date are required".

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLectureDto {
    pub title: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub duration: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendanceDto {
    pub present_students: Option<Vec<Uuid>>,
    pub date: Option<DateTime<Utc>>,
    pub lecture_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGradeDto {
    pub student_id: Option<Uuid>,
    pub title: Option<String>,
    pub marks: Option<f64>,
    pub max_marks: Option<f64>,
    pub grade_type: Option<GradeType>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkGradeEntry {
    pub student_id: Uuid,
    pub marks: f64,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkGradesDto {
    pub title: Option<String>,
    pub max_marks: Option<f64>,
    pub grade_type: Option<GradeType>,
    pub remarks: Option<String>,
    #[serde(default)]
    pub grades: Vec<BulkGradeEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkGradesResult {
    pub count: usize,
    pub grades: Vec<Grade>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNoteDto {
    pub title: Option<String>,
    pub drive_link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePastPaperDto {
    pub title: Option<String>,
    pub drive_link: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDiscussionDto {
    pub message: Option<String>,
}

/// Validated grade ready to insert.
#[derive(Debug, Clone)]
pub struct NewGrade {
    pub student_id: Uuid,
    pub title: String,
    pub marks: f64,
    pub max_marks: f64,
    pub grade_type: GradeType,
    pub remarks: Option<String>,
}

impl NewGrade {
    pub fn is_within_bounds(&self) -> bool {
        self.max_marks > 0.0 && self.marks >= 0.0 && self.marks <= self.max_marks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_type_serializes_as_role_name() {
        assert_eq!(
            serde_json::to_string(&AuthorType::Faculty).unwrap(),
            "\"Faculty\""
        );
    }

    #[test]
    fn test_grade_bounds() {
        let grade = NewGrade {
            student_id: Uuid::nil(),
            title: "Midterm".to_string(),
            marks: 45.0,
            max_marks: 50.0,
            grade_type: GradeType::Exam,
            remarks: None,
        };
        assert!(grade.is_within_bounds());
        assert!(
            !NewGrade {
                marks: 51.0,
                ..grade.clone()
            }
            .is_within_bounds()
        );
        assert!(
            !NewGrade {
                marks: -1.0,
                ..grade
            }
            .is_within_bounds()
        );
    }

    #[test]
    fn test_bulk_grades_dto_defaults_to_empty() {
        let dto: BulkGradesDto =
            serde_json::from_str(r#"{"title":"Quiz 1","max_marks":10,"grade_type":"quiz"}"#)
                .unwrap();
        assert!(dto.grades.is_empty());
        assert_eq!(dto.grade_type, Some(GradeType::Quiz));
    }

    #[test]
    fn test_lecture_duration_validation() {
        let dto = CreateLectureDto {
            title: Some("Intro".to_string()),
            scheduled_date: Some(Utc::now()),
            description: None,
            duration: Some(0),
        };
        assert!(dto.validate().is_err());
    }
}
