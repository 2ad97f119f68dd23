use axum::extract::{Path, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::classes::{
    AuthorType, ClassService, ClassSummary, CreateDiscussionDto, CreateNoteDto,
    CreatePastPaperDto, Discussion, EnrollClassDto, Note, PastPaper, Reply, StudentClassView,
};
use crate::modules::domains::{DomainService, DomainSummary};
use crate::state::AppState;
use crate::validator::{JsonBody, ValidatedJson, required, required_text};

use super::model::{StudentProfile, UpdateStudentProfileDto};
use super::service::StudentService;

#[utoipa::path(
    get,
    path = "/api/v1/student/profile",
    responses((status = 200, description = "Profile with class name", body = StudentProfile)),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<StudentProfile>, AppError> {
    let profile = StudentService::get_profile(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Profile fetched successfully", profile))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/profile",
    request_body = UpdateStudentProfileDto,
    responses((status = 200, description = "Profile updated", body = StudentProfile)),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateStudentProfileDto>,
) -> Result<ApiResponse<StudentProfile>, AppError> {
    let profile = StudentService::update_profile(&state.db, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::ok("Profile updated successfully", profile))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/get-domains",
    responses((status = 200, description = "Domains a complaint can be filed under", body = Vec<DomainSummary>)),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_domains(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<DomainSummary>>, AppError> {
    let domains = DomainService::list_domain_summaries(&state.db).await?;
    Ok(ApiResponse::ok("Domains fetched successfully", domains))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/explore-classes",
    responses((status = 200, description = "Every class with teacher and size", body = Vec<ClassSummary>)),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn explore_classes(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ClassSummary>>, AppError> {
    let classes = ClassService::list_classes(&state.db).await?;
    Ok(ApiResponse::ok("Classes fetched successfully", classes))
}

#[utoipa::path(
    post,
    path = "/api/v1/student/enroll-class",
    request_body = EnrollClassDto,
    responses(
        (status = 200, description = "Enrolled", body = ClassSummary),
        (status = 400, description = "Already enrolled in this class", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn enroll_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(dto): JsonBody<EnrollClassDto>,
) -> Result<ApiResponse<ClassSummary>, AppError> {
    let class_id = required(dto.class_id, "Class ID is required")?;
    let class = ClassService::enroll(&state.db, auth_user.user_id()?, class_id).await?;
    Ok(ApiResponse::ok("Enrolled successfully", class))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/class/{class_id}",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class with upcoming lectures and my records", body = StudentClassView),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class_details(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
) -> Result<ApiResponse<StudentClassView>, AppError> {
    let view = ClassService::student_view(&state.db, class_id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Class details fetched successfully", view))
}

#[utoipa::path(
    post,
    path = "/api/v1/student/class/{class_id}/note",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = CreateNoteDto,
    responses(
        (status = 201, description = "Note shared", body = Note),
        (status = 400, description = "Title and drive link are required", body = ErrorResponse)
    ),
    tag = "Student",
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
        AuthorType::Student,
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
    path = "/api/v1/student/class/{class_id}/past-paper",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = CreatePastPaperDto,
    responses(
        (status = 201, description = "Past paper shared", body = PastPaper),
        (status = 400, description = "Title and drive link are required", body = ErrorResponse)
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_past_paper(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    JsonBody(dto): JsonBody<CreatePastPaperDto>,
) -> Result<ApiResponse<PastPaper>, AppError> {
    const MISSING: &str = "Title and drive link are required";
    let title = required_text(dto.title, MISSING)?;
    let drive_link = required_text(dto.drive_link, MISSING)?;

    let paper = ClassService::add_past_paper(
        &state.db,
        class_id,
        AuthorType::Student,
        auth_user.user_id()?,
        title,
        drive_link,
        dto.year,
        dto.semester,
    )
    .await?;
    Ok(ApiResponse::created("Past paper added successfully", paper))
}

#[utoipa::path(
    post,
    path = "/api/v1/student/class/{class_id}/discussion",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body = CreateDiscussionDto,
    responses(
        (status = 201, description = "Discussion opened", body = Discussion),
        (status = 400, description = "Message is required", body = ErrorResponse)
    ),
    tag = "Student",
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
        AuthorType::Student,
        auth_user.user_id()?,
        message,
    )
    .await?;
    Ok(ApiResponse::created("Discussion created successfully", discussion))
}

#[utoipa::path(
    post,
    path = "/api/v1/student/discussion/{discussion_id}/reply",
    params(("discussion_id" = Uuid, Path, description = "Discussion ID")),
    request_body = CreateDiscussionDto,
    responses(
        (status = 201, description = "Reply posted", body = Reply),
        (status = 404, description = "Discussion not found", body = ErrorResponse)
    ),
    tag = "Student",
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
        AuthorType::Student,
        auth_user.user_id()?,
        message,
    )
    .await?;
    Ok(ApiResponse::created("Reply added successfully", reply))
}
