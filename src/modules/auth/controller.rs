use axum::extract::State;
use campusdesk_auth::Role;
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{Admin, LoginRequest, LoginResponse, RegisterAdminDto};
use super::service::AuthService;

async fn login_as(
    state: &AppState,
    role: Role,
    dto: LoginRequest,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, role, dto, &state.jwt_config).await?;
    Ok(ApiResponse::ok(
        format!("{} logged in successfully", role),
        response,
    ))
}

/// Admin sign-in
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "Admin not found", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn admin_login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    login_as(&state, Role::Admin, dto).await
}

/// Student sign-in
#[utoipa::path(
    post,
    path = "/api/v1/student/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn student_login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    login_as(&state, Role::Student, dto).await
}

/// Faculty sign-in
#[utoipa::path(
    post,
    path = "/api/v1/faculty/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "Faculty not found", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn faculty_login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    login_as(&state, Role::Faculty, dto).await
}

/// Authority sign-in. The token carries the authority's domain at sign-in time.
#[utoipa::path(
    post,
    path = "/api/v1/authority/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "Authority not found", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn authority_login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    login_as(&state, Role::Authority, dto).await
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/register",
    request_body = RegisterAdminDto,
    responses(
        (status = 201, description = "Admin registered", body = Admin),
        (status = 400, description = "Admin already exists", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterAdminDto>,
) -> Result<ApiResponse<Admin>, AppError> {
    let admin = AuthService::register_admin(&state.db, dto).await?;
    Ok(ApiResponse::created("Admin registered successfully", admin))
}
