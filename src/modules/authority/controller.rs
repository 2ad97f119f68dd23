use axum::extract::{Path, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::domains::DomainService;
use crate::modules::problems::ProblemService;
use crate::state::AppState;
use crate::validator::{JsonBody, ValidatedJson};

use super::model::{
    AuthorityDomain, AuthorityStats, CreateDomainDto, DomainDetail, DomainMember, Problem,
    ProblemWithComments, TransferProblemDto, UpdateDomainDto, UpdateProblemStatusDto,
};
use super::service::{AuthorityService, parse_status_update};

#[utoipa::path(
    get,
    path = "/api/v1/authority/complaints",
    responses(
        (status = 200, description = "Unaccepted complaints in my domain and the ones I accepted", body = Vec<Problem>),
        (status = 400, description = "You are not assigned to any domain", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_complaints(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<Problem>>, AppError> {
    let authority_id = auth_user.user_id()?;
    let domain_id = AuthorityService::require_domain(&state.db, authority_id).await?;
    let problems =
        ProblemService::list_open_to_authority(&state.db, domain_id, authority_id).await?;
    Ok(ApiResponse::ok("Complaints fetched successfully", problems))
}

#[utoipa::path(
    post,
    path = "/api/v1/authority/complaints/{id}/accept",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint accepted", body = Problem),
        (status = 400, description = "Already accepted by someone else", body = ErrorResponse),
        (status = 403, description = "Complaint is in another domain", body = ErrorResponse),
        (status = 404, description = "Complaint not found", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn accept_complaint(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Problem>, AppError> {
    let authority_id = auth_user.user_id()?;
    let domain_id = AuthorityService::require_domain(&state.db, authority_id).await?;
    let problem = ProblemService::accept(&state.db, id, authority_id, domain_id).await?;
    Ok(ApiResponse::ok("Complaint accepted successfully", problem))
}

#[utoipa::path(
    post,
    path = "/api/v1/authority/complaints/{id}/transfer",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = TransferProblemDto,
    responses(
        (status = 200, description = "Complaint handed to a colleague", body = Problem),
        (status = 400, description = "Target is in another domain", body = ErrorResponse),
        (status = 403, description = "Only the acceptor may transfer", body = ErrorResponse),
        (status = 404, description = "Complaint or target not found", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn transfer_complaint(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(dto): JsonBody<TransferProblemDto>,
) -> Result<ApiResponse<Problem>, AppError> {
    let problem =
        ProblemService::transfer(&state.db, id, auth_user.user_id()?, dto.authority_id).await?;
    Ok(ApiResponse::ok("Complaint transferred successfully", problem))
}

#[utoipa::path(
    put,
    path = "/api/v1/authority/complaints/{id}/status",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateProblemStatusDto,
    responses(
        (status = 200, description = "Status updated with a comment", body = ProblemWithComments),
        (status = 400, description = "Invalid status or missing comment", body = ErrorResponse),
        (status = 403, description = "Only the acceptor may update", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_complaint_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(dto): JsonBody<UpdateProblemStatusDto>,
) -> Result<ApiResponse<ProblemWithComments>, AppError> {
    let (status, comment) = parse_status_update(dto.status.as_deref(), dto.comment.as_deref())?;
    let problem =
        ProblemService::update_status(&state.db, id, auth_user.user_id()?, status, &comment)
            .await?;
    Ok(ApiResponse::ok("Complaint status updated successfully", problem))
}

#[utoipa::path(
    get,
    path = "/api/v1/authority/assigned-complaints",
    responses((status = 200, description = "Complaints I accepted", body = Vec<Problem>)),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_assigned_complaints(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<Problem>>, AppError> {
    let problems = ProblemService::list_accepted_by(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Assigned complaints fetched successfully", problems))
}

#[utoipa::path(
    get,
    path = "/api/v1/authority/stats",
    responses(
        (status = 200, description = "Domain and personal complaint counts", body = AuthorityStats),
        (status = 400, description = "You are not assigned to any domain", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<AuthorityStats>, AppError> {
    let stats = AuthorityService::stats(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Stats fetched successfully", stats))
}

#[utoipa::path(
    get,
    path = "/api/v1/authority/colleagues",
    responses((status = 200, description = "Other authorities in my domain", body = Vec<DomainMember>)),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_colleagues(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<DomainMember>>, AppError> {
    let colleagues = AuthorityService::colleagues(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Colleagues fetched successfully", colleagues))
}

/// Create a domain and join it
#[utoipa::path(
    post,
    path = "/api/v1/authority/domain/create",
    request_body = CreateDomainDto,
    responses(
        (status = 201, description = "Domain created with the caller as member", body = AuthorityDomain),
        (status = 400, description = "Domain already exists", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_domain(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateDomainDto>,
) -> Result<ApiResponse<AuthorityDomain>, AppError> {
    let domain =
        DomainService::create_domain_for_authority(&state.db, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::created("Domain created successfully", domain))
}

#[utoipa::path(
    get,
    path = "/api/v1/authority/domain/all",
    responses((status = 200, description = "All domains", body = Vec<AuthorityDomain>)),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_all_domains(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<AuthorityDomain>>, AppError> {
    let domains = DomainService::list_domains(&state.db).await?;
    Ok(ApiResponse::ok("Domains fetched successfully", domains))
}

#[utoipa::path(
    get,
    path = "/api/v1/authority/domain/my",
    responses(
        (status = 200, description = "My domain with its members", body = DomainDetail),
        (status = 400, description = "You are not assigned to any domain", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_domain(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<DomainDetail>, AppError> {
    let domain_id = AuthorityService::require_domain(&state.db, auth_user.user_id()?).await?;
    let detail = DomainService::get_domain_detail(&state.db, domain_id).await?;
    Ok(ApiResponse::ok("Domain fetched successfully", detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/authority/domain/{id}",
    params(("id" = Uuid, Path, description = "Domain ID")),
    responses(
        (status = 200, description = "Domain with its members", body = DomainDetail),
        (status = 404, description = "Domain not found", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_domain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<DomainDetail>, AppError> {
    let detail = DomainService::get_domain_detail(&state.db, id).await?;
    Ok(ApiResponse::ok("Domain fetched successfully", detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/authority/domain/{id}/update",
    params(("id" = Uuid, Path, description = "Domain ID")),
    request_body = UpdateDomainDto,
    responses(
        (status = 200, description = "Domain updated", body = AuthorityDomain),
        (status = 403, description = "You are not a member of this domain", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_domain(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateDomainDto>,
) -> Result<ApiResponse<AuthorityDomain>, AppError> {
    AuthorityService::require_membership(&state.db, auth_user.user_id()?, id).await?;
    let domain = DomainService::update_domain(&state.db, id, dto).await?;
    Ok(ApiResponse::ok("Domain updated successfully", domain))
}

#[utoipa::path(
    delete,
    path = "/api/v1/authority/domain/{id}/delete",
    params(("id" = Uuid, Path, description = "Domain ID")),
    responses(
        (status = 200, description = "Domain deleted; members are left without a domain"),
        (status = 400, description = "Domain still has complaints", body = ErrorResponse),
        (status = 403, description = "You are not a member of this domain", body = ErrorResponse)
    ),
    tag = "Authority",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_domain(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    AuthorityService::require_membership(&state.db, auth_user.user_id()?, id).await?;
    DomainService::delete_domain(&state.db, id).await?;
    Ok(ApiResponse::empty("Domain deleted successfully"))
}
