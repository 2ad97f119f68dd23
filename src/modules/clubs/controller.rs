use anyhow::anyhow;
use axum::extract::{Multipart, Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireStudent;
use crate::modules::events::Event;
use crate::state::AppState;
use crate::utils::multipart::{MultipartForm, upload_image};
use crate::validator::ValidatedJson;

use super::model::{
    Club, ClubAnnouncement, ClubDetail, ClubFilter, ClubMember, CreateClubAnnouncementDto,
    CreateClubDto, CreateClubEventDto, GalleryImage, UpdateClubDto,
};
use super::service::ClubService;

#[utoipa::path(
    get,
    path = "/api/v1/campus/clubs",
    params(ClubFilter),
    responses((status = 200, description = "Clubs matching the search", body = Vec<Club>)),
    tag = "Clubs"
)]
#[instrument(skip(state))]
pub async fn get_clubs(
    State(state): State<AppState>,
    Query(filter): Query<ClubFilter>,
) -> Result<ApiResponse<Vec<Club>>, AppError> {
    let clubs = ClubService::list(&state.db, filter).await?;
    Ok(ApiResponse::ok("Clubs fetched successfully", clubs))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/clubs/{id}",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club with members, announcements, gallery and events", body = ClubDetail),
        (status = 404, description = "Club not found", body = ErrorResponse)
    ),
    tag = "Clubs"
)]
#[instrument(skip(state))]
pub async fn get_club(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ClubDetail>, AppError> {
    let club = ClubService::get_detail(&state.db, id).await?;
    Ok(ApiResponse::ok("Club fetched successfully", club))
}

/// Create a club
///
/// `advisor` resolves to a faculty account and `leader` to a student
/// account, each by id or email.
#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs",
    request_body = CreateClubDto,
    responses(
        (status = 201, description = "Club created", body = Club),
        (status = 400, description = "Club already exists", body = ErrorResponse),
        (status = 404, description = "Advisor or leader not found", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_club(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateClubDto>,
) -> Result<ApiResponse<Club>, AppError> {
    let club = ClubService::create(&state.db, dto).await?;
    Ok(ApiResponse::created("Club created successfully", club))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs/{id}/join",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Join request submitted"),
        (status = 400, description = "Already a member or request pending", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn join_club(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    ClubService::join(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::empty("Join request sent successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs/{id}/leave",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Left the club"),
        (status = 400, description = "Not a member or caller is the leader", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn leave_club(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    ClubService::leave(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::empty("Left club successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/campus/clubs/{id}",
    params(("id" = Uuid, Path, description = "Club ID")),
    request_body = UpdateClubDto,
    responses(
        (status = 200, description = "Club updated", body = Club),
        (status = 403, description = "Not the club leader", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_club(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateClubDto>,
) -> Result<ApiResponse<Club>, AppError> {
    let club = ClubService::update(&state.db, id, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::ok("Club updated successfully", club))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs/{id}/announcement",
    params(("id" = Uuid, Path, description = "Club ID")),
    request_body = CreateClubAnnouncementDto,
    responses(
        (status = 201, description = "Announcement posted", body = ClubAnnouncement),
        (status = 403, description = "Not the leader or advisor", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateClubAnnouncementDto>,
) -> Result<ApiResponse<ClubAnnouncement>, AppError> {
    let announcement = ClubService::add_announcement(
        &state.db,
        id,
        auth_user.user_id()?,
        &dto.title,
        &dto.content,
    )
    .await?;
    Ok(ApiResponse::created("Announcement added successfully", announcement))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs/{id}/gallery",
    params(("id" = Uuid, Path, description = "Club ID")),
    request_body(content_type = "multipart/form-data", description = "`image` file"),
    responses(
        (status = 201, description = "Image added", body = GalleryImage),
        (status = 400, description = "Image is required", body = ErrorResponse),
        (status = 403, description = "Not the leader or advisor", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn add_gallery_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<ApiResponse<GalleryImage>, AppError> {
    ClubService::ensure_manager(&state.db, id, auth_user.user_id()?).await?;

    let mut form = MultipartForm::collect(multipart).await?;
    let file = form
        .take_file("image")
        .ok_or_else(|| AppError::bad_request(anyhow!("Image is required")))?;
    let url = upload_image(state.storage.as_ref(), "clubs", &file).await?;

    let image = ClubService::add_gallery_image(&state.db, id, &url).await?;
    Ok(ApiResponse::created("Image added successfully", image))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/clubs/{id}/requests",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Pending join requests", body = Vec<ClubMember>),
        (status = 403, description = "Not the leader or advisor", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Vec<ClubMember>>, AppError> {
    let requests = ClubService::pending_requests(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Join requests fetched successfully", requests))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs/{id}/approve/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Club ID"),
        ("student_id" = Uuid, Path, description = "Requesting student ID")
    ),
    responses(
        (status = 200, description = "Membership approved"),
        (status = 404, description = "No pending request found", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn approve_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse<()>, AppError> {
    ClubService::approve(&state.db, id, auth_user.user_id()?, student_id).await?;
    Ok(ApiResponse::empty("Member approved successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs/{id}/reject/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Club ID"),
        ("student_id" = Uuid, Path, description = "Requesting student ID")
    ),
    responses(
        (status = 200, description = "Request rejected"),
        (status = 404, description = "No pending request found", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn reject_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse<()>, AppError> {
    ClubService::reject(&state.db, id, auth_user.user_id()?, student_id).await?;
    Ok(ApiResponse::empty("Request rejected successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/clubs/{id}/event",
    params(("id" = Uuid, Path, description = "Club ID")),
    request_body = CreateClubEventDto,
    responses(
        (status = 201, description = "Club event created", body = Event),
        (status = 400, description = "End date must be after start date", body = ErrorResponse),
        (status = 403, description = "Not the leader or advisor", body = ErrorResponse)
    ),
    tag = "Clubs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_club_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateClubEventDto>,
) -> Result<ApiResponse<Event>, AppError> {
    let event = ClubService::create_event(&state.db, id, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::created("Event created successfully", event))
}
