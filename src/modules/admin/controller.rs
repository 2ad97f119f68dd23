use anyhow::anyhow;
use axum::extract::{Multipart, Path, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::classes::{ClassRecord, ClassService, ClassSummary, CreateClassDto};
use crate::modules::domains::{
    AddAuthorityToDomainDto, AuthorityDomain, CreateDomainDto, DomainDetail, DomainMember,
    DomainService, DomainWithStats,
};
use crate::state::AppState;
use crate::utils::multipart::MultipartForm;
use crate::utils::spreadsheet::parse_student_rows;
use crate::validator::ValidatedJson;

use super::model::{
    Authority, BulkImportResult, CreateAuthorityDto, CreateFacultyDto, CreateStudentDto, Faculty,
    SendWorkReportDto, Student, WorkReportSent,
};
use super::service::AdminService;

#[utoipa::path(
    post,
    path = "/api/v1/admin/create-class",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = ClassRecord),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<ApiResponse<ClassRecord>, AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok(ApiResponse::created("Class created successfully", class))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/get-classes",
    responses((status = 200, description = "All classes", body = Vec<ClassSummary>)),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ClassSummary>>, AppError> {
    let classes = ClassService::list_classes(&state.db).await?;
    Ok(ApiResponse::ok("Classes fetched successfully", classes))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/delete-class/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted"),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    ClassService::delete_class(&state.db, id).await?;
    Ok(ApiResponse::empty("Class deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/create-faculty",
    request_body = CreateFacultyDto,
    responses(
        (status = 201, description = "Faculty created with a derived password", body = Faculty),
        (status = 400, description = "Faculty already exists", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_faculty(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateFacultyDto>,
) -> Result<ApiResponse<Faculty>, AppError> {
    let faculty = AdminService::create_faculty(&state.db, dto).await?;
    Ok(ApiResponse::created("Faculty created successfully", faculty))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/get-faculties",
    responses((status = 200, description = "All faculty", body = Vec<Faculty>)),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_faculties(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Faculty>>, AppError> {
    let faculty = AdminService::list_faculty(&state.db).await?;
    Ok(ApiResponse::ok("Faculties fetched successfully", faculty))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/delete-faculty/{id}",
    params(("id" = Uuid, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty deleted"),
        (status = 404, description = "Faculty not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_faculty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    AdminService::delete_faculty(&state.db, id).await?;
    Ok(ApiResponse::empty("Faculty deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/create-student",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created with a derived password", body = Student),
        (status = 400, description = "Student already exists", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<ApiResponse<Student>, AppError> {
    let student = AdminService::create_student(&state.db, dto).await?;
    Ok(ApiResponse::created("Student created successfully", student))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/get-students",
    responses((status = 200, description = "All students", body = Vec<Student>)),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Student>>, AppError> {
    let students = AdminService::list_students(&state.db).await?;
    Ok(ApiResponse::ok("Students fetched successfully", students))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/delete-student/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    AdminService::delete_student(&state.db, id).await?;
    Ok(ApiResponse::empty("Student deleted successfully"))
}

/// Import students from a spreadsheet
///
/// Multipart field `file`: xlsx, xls or ods with a header row holding `name`
/// and `email` (or `emailid`) columns.
#[utoipa::path(
    post,
    path = "/api/v1/admin/bulk-create-students",
    request_body(content_type = "multipart/form-data", description = "Spreadsheet in field `file`"),
    responses(
        (status = 200, description = "Import finished; skipped rows are listed in `errors`", body = BulkImportResult),
        (status = 400, description = "Missing, unreadable or empty file", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn bulk_create_students(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<BulkImportResult>, AppError> {
    let mut form = MultipartForm::collect(multipart).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::bad_request(anyhow!("File not found")))?;

    let rows = parse_student_rows(&file.bytes)
        .map_err(|e| AppError::bad_request(anyhow!("Failed to read Excel file: {}", e)))?;

    if rows.is_empty() {
        return Err(AppError::bad_request(anyhow!("No data found in file")));
    }

    let result = AdminService::bulk_create_students(&state.db, rows).await?;
    Ok(ApiResponse::ok(
        format!(
            "Bulk creation completed. Created {} students.",
            result.created_count
        ),
        result,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/create-authority",
    request_body = CreateAuthorityDto,
    responses(
        (status = 201, description = "Authority created", body = Authority),
        (status = 400, description = "Authority already exists", body = ErrorResponse),
        (status = 404, description = "Domain not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_authority(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAuthorityDto>,
) -> Result<ApiResponse<Authority>, AppError> {
    let authority = AdminService::create_authority(&state.db, dto).await?;
    Ok(ApiResponse::created("Authority created successfully", authority))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/get-authorities",
    responses((status = 200, description = "All authorities", body = Vec<Authority>)),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_authorities(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Authority>>, AppError> {
    let authorities = AdminService::list_authorities(&state.db).await?;
    Ok(ApiResponse::ok("Authorities fetched successfully", authorities))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/delete-authority/{id}",
    params(("id" = Uuid, Path, description = "Authority ID")),
    responses(
        (status = 200, description = "Authority deleted"),
        (status = 404, description = "Authority not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_authority(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    AdminService::delete_authority(&state.db, id).await?;
    Ok(ApiResponse::empty("Authority deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/create-domain",
    request_body = CreateDomainDto,
    responses(
        (status = 201, description = "Domain created", body = AuthorityDomain),
        (status = 400, description = "Domain already exists", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_domain(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDomainDto>,
) -> Result<ApiResponse<AuthorityDomain>, AppError> {
    let domain = DomainService::create_domain(&state.db, dto).await?;
    Ok(ApiResponse::created("Domain created successfully", domain))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/get-domains",
    responses((status = 200, description = "Domains with authority counts", body = Vec<DomainWithStats>)),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_domains(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<DomainWithStats>>, AppError> {
    let domains = DomainService::list_domains_with_stats(&state.db).await?;
    Ok(ApiResponse::ok("Domains fetched successfully", domains))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/get-domain-authorities/{domain_id}",
    params(("domain_id" = Uuid, Path, description = "Domain ID")),
    responses(
        (status = 200, description = "Authorities in the domain", body = Vec<DomainMember>),
        (status = 404, description = "Domain not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_domain_authorities(
    State(state): State<AppState>,
    Path(domain_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<DomainMember>>, AppError> {
    DomainService::get_domain(&state.db, domain_id).await?;
    let members = DomainService::members(&state.db, domain_id).await?;
    Ok(ApiResponse::ok("Domain authorities fetched successfully", members))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/add-authority-to-domain",
    request_body = AddAuthorityToDomainDto,
    responses(
        (status = 200, description = "Authority moved into the domain", body = DomainDetail),
        (status = 404, description = "Domain or authority not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_authority_to_domain(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<AddAuthorityToDomainDto>,
) -> Result<ApiResponse<DomainDetail>, AppError> {
    let detail =
        DomainService::add_authority_to_domain(&state.db, dto.authority_id, dto.domain_id).await?;
    Ok(ApiResponse::ok("Authority added to domain successfully", detail))
}

/// Email the platform work report
///
/// Sent to `email` when given, otherwise to the signed-in admin.
#[utoipa::path(
    post,
    path = "/api/v1/admin/send-work-report",
    request_body = SendWorkReportDto,
    responses(
        (status = 200, description = "Report sent", body = WorkReportSent),
        (status = 500, description = "Failed to send work report", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn send_work_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Option<ValidatedJson<SendWorkReportDto>>,
) -> Result<ApiResponse<WorkReportSent>, AppError> {
    let dto = body.map(|ValidatedJson(dto)| dto).unwrap_or_default();
    let sent_to = dto
        .email
        .unwrap_or_else(|| auth_user.email().to_string());

    let report = AdminService::work_report(&state.db).await?;

    state
        .mailer
        .send_work_report(&sent_to, &report)
        .await
        .map_err(|e| {
            error!(to = %sent_to, error = %e.error, "Work report email failed");
            AppError::internal_error("Failed to send work report")
        })?;

    Ok(ApiResponse::ok(
        "Work report sent successfully",
        WorkReportSent { sent_to, report },
    ))
}
