use axum::extract::{Path, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::classes::{
    AttendanceSession, AuthorType, BulkGradesDto, BulkGradesResult, ClassService,
    ClassWithStudents, CreateDiscussionDto, CreateGradeDto, CreateLectureDto, CreateNoteDto,
    Discussion, FacultyClassView, Grade, Lecture, MarkAttendanceDto, Note, Reply,
    service::{grade_from_dto, grades_from_bulk},
};
use crate::state::AppState;
use crate::validator::{JsonBody, ValidatedJson, required, required_text};

#[utoipa::path(
    get,
    path = "/api/v1/faculty/my-classes",
    responses((status = 200, description = "Classes I teach with their students", body = Vec<ClassWithStudents>)),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<ClassWithStudents>>, AppError> {
    let classes = ClassService::classes_for_teacher(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Classes fetched successfully", classes))
}

#[utoipa::path(
    get,
    path = "/api/v1/faculty/class/{class_id}",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Full class record", body = FacultyClassView),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class_details(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<ApiResponse<FacultyClassView>, AppError> {
    let view = ClassService::faculty_view(&state.db, class_id).await?;
    Ok(ApiResponse::ok("Class details fetched successfully", view))
}

#[utoipa::path(
    post,
    path = "/api/v1/faculty/class/{class_id}/lecture",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = CreateLectureDto,
    responses(
        (status = 201, description = "Lecture scheduled", body = Lecture),
        (status = 400, description = "Title and scheduled date are required", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_lecture(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateLectureDto>,
) -> Result<ApiResponse<Lecture>, AppError> {
    const MISSING: &str = "Title and scheduled date are required";
    let title = required_text(dto.title, MISSING)?;
    let scheduled_date = required(dto.scheduled_date, MISSING)?;

    let lecture = ClassService::add_lecture(
        &state.db,
        class_id,
        auth_user.user_id()?,
        title,
        scheduled_date,
        dto.description,
        dto.duration,
    )
    .await?;
    Ok(ApiResponse::created("Lecture added successfully", lecture))
}

/// Record attendance
///
/// Every enrolled student not listed in `present_students` is marked absent.
#[utoipa::path(
    post,
    path = "/api/v1/faculty/class/{class_id}/attendance",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = MarkAttendanceDto,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceSession),
        (status = 400, description = "Present students array is required", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    JsonBody(dto): JsonBody<MarkAttendanceDto>,
) -> Result<ApiResponse<AttendanceSession>, AppError> {
    let present = required(dto.present_students, "Present students array is required")?;
    let session = ClassService::mark_attendance(
        &state.db,
        class_id,
        auth_user.user_id()?,
        present,
        dto.date,
        dto.lecture_id,
    )
    .await?;
    Ok(ApiResponse::created("Attendance marked successfully", session))
}

#[utoipa::path(
    post,
    path = "/api/v1/faculty/class/{class_id}/grade",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade recorded", body = Grade),
        (status = 400, description = "Missing fields or marks out of range", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    JsonBody(dto): JsonBody<CreateGradeDto>,
) -> Result<ApiResponse<Grade>, AppError> {
    let grade = grade_from_dto(dto)?;
    let mut grades =
        ClassService::add_grades(&state.db, class_id, auth_user.user_id()?, vec![grade]).await?;
    let grade = grades
        .pop()
        .ok_or_else(|| AppError::internal_error("Grade was not recorded"))?;
    Ok(ApiResponse::created("Grade added successfully", grade))
}

#[utoipa::path(
    post,
    path = "/api/v1/faculty/class/{class_id}/grades/bulk",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = BulkGradesDto,
    responses(
        (status = 201, description = "Grades recorded in one transaction", body = BulkGradesResult),
        (status = 400, description = "Missing fields or marks out of range", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_bulk_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    JsonBody(dto): JsonBody<BulkGradesDto>,
) -> Result<ApiResponse<BulkGradesResult>, AppError> {
    let grades = grades_from_bulk(dto)?;
    let grades = ClassService::add_grades(&state.db, class_id, auth_user.user_id()?, grades).await?;
    Ok(ApiResponse::created(
        format!("{} grades added successfully", grades.len()),
        BulkGradesResult {
            count: grades.len(),
            grades,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/faculty/class/{class_id}/note",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = CreateNoteDto,
    responses(
        (status = 201, description = "Note shared", body = Note),
        (status = 400, description = "Title and drive link are required", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    JsonBody(dto): JsonBody<CreateNoteDto>,
) -> Result<ApiResponse<Note>, AppError> {
    const MISSING: &str = "Title and drive link are required";
    let title = required_text(dto.title, MISSING)?;
    let drive_link = required_text(dto.drive_link, MISSING)?;

    let note = ClassService::add_note(
        &state.db,
        class_id,
        AuthorType::Faculty,
        auth_user.user_id()?,
        title,
        drive_link,
        dto.description,
    )
    .await?;
    Ok(ApiResponse::created("Note added successfully", note))
}

#[utoipa::path(
    post,
    path = "/api/v1/faculty/class/{class_id}/discussion",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = CreateDiscussionDto,
    responses(
        (status = 201, description = "Discussion opened", body = Discussion),
        (status = 400, description = "Message is required", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_discussion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    JsonBody(dto): JsonBody<CreateDiscussionDto>,
) -> Result<ApiResponse<Discussion>, AppError> {
    let message = required_text(dto.message, "Message is required")?;
    let discussion = ClassService::add_discussion(
        &state.db,
        class_id,
        AuthorType::Faculty,
        auth_user.user_id()?,
        message,
    )
    .await?;
    Ok(ApiResponse::created("Discussion created successfully", discussion))
}

#[utoipa::path(
    post,
    path = "/api/v1/faculty/discussion/{discussion_id}/reply",
    params(("discussion_id" = Uuid, Path, description = "Discussion ID")),
    request_body = CreateDiscussionDto,
    responses(
        (status = 201, description = "Reply posted", body = Reply),
        (status = 404, description = "Discussion not found", body = ErrorResponse)
    ),
    tag = "Faculty",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_reply(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(discussion_id): Path<Uuid>,
    JsonBody(dto): JsonBody<CreateDiscussionDto>,
) -> Result<ApiResponse<Reply>, AppError> {
    let message = required_text(dto.message, "Message is required")?;
    let reply = ClassService::add_reply(
        &state.db,
        discussion_id,
        AuthorType::Faculty,
        auth_user.user_id()?,
        message,
    )
    .await?;
    Ok(ApiResponse::created("Reply added successfully", reply))
}
