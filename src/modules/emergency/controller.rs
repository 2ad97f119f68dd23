use axum::extract::{Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{RequireStudent, check_any_role};
use crate::state::AppState;
use crate::validator::{JsonBody, ValidatedJson};
use campusdesk_auth::Role;

use super::model::{
    CreateEmergencyAlertDto, EmergencyAlert, EmergencyFilter, UpdateEmergencyStatusDto,
};
use super::service::EmergencyService;

const RESPONDER_ROLES: [Role; 3] = [Role::Admin, Role::Faculty, Role::Authority];

#[utoipa::path(
    post,
    path = "/api/v1/campus/emergency",
    request_body = CreateEmergencyAlertDto,
    responses(
        (status = 201, description = "Alert reported", body = EmergencyAlert),
        (status = 403, description = "Students only", body = ErrorResponse)
    ),
    tag = "Emergency",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_alert(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    ValidatedJson(dto): ValidatedJson<CreateEmergencyAlertDto>,
) -> Result<ApiResponse<EmergencyAlert>, AppError> {
    let alert = EmergencyService::create(&state.db, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::created("Emergency alert created", alert))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/emergency",
    params(EmergencyFilter),
    responses((status = 200, description = "Alerts, most recent first", body = Vec<EmergencyAlert>)),
    tag = "Emergency",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_alerts(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filter): Query<EmergencyFilter>,
) -> Result<ApiResponse<Vec<EmergencyAlert>>, AppError> {
    let alerts = EmergencyService::list(&state.db, filter).await?;
    Ok(ApiResponse::ok("Alerts fetched successfully", alerts))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/emergency/my-alerts",
    responses((status = 200, description = "Caller's alerts", body = Vec<EmergencyAlert>)),
    tag = "Emergency",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_alerts(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<EmergencyAlert>>, AppError> {
    let alerts = EmergencyService::list_for_student(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Alerts fetched successfully", alerts))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/emergency/{id}",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert with responders", body = EmergencyAlert),
        (status = 404, description = "Alert not found", body = ErrorResponse)
    ),
    tag = "Emergency",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_alert(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<EmergencyAlert>, AppError> {
    let alert = EmergencyService::get_alert(&state.db, id).await?;
    Ok(ApiResponse::ok("Alert fetched successfully", alert))
}

#[utoipa::path(
    put,
    path = "/api/v1/campus/emergency/{id}/status",
    params(("id" = Uuid, Path, description = "Alert ID")),
    request_body = UpdateEmergencyStatusDto,
    responses(
        (status = 200, description = "Alert updated", body = EmergencyAlert),
        (status = 400, description = "Responder contact is required", body = ErrorResponse),
        (status = 403, description = "Admin, Faculty or Authority only", body = ErrorResponse)
    ),
    tag = "Emergency",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_alert_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(dto): JsonBody<UpdateEmergencyStatusDto>,
) -> Result<ApiResponse<EmergencyAlert>, AppError> {
    check_any_role(&auth_user, &RESPONDER_ROLES)?;
    let alert = EmergencyService::update_status(
        &state.db,
        id,
        auth_user.user_id()?,
        dto.status,
        dto.responder_contact,
    )
    .await?;
    Ok(ApiResponse::ok("Alert updated successfully", alert))
}

#[utoipa::path(
    put,
    path = "/api/v1/campus/emergency/{id}/cancel",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert cancelled", body = EmergencyAlert),
        (status = 400, description = "Alert is already closed", body = ErrorResponse),
        (status = 403, description = "Not the reporter", body = ErrorResponse)
    ),
    tag = "Emergency",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn cancel_alert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<EmergencyAlert>, AppError> {
    let alert = EmergencyService::cancel(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Alert cancelled", alert))
}
