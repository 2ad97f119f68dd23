use anyhow::anyhow;
use axum::extract::{Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::{ValidatedJson, required_text};

use super::model::{
    Announcement, AnnouncementCategory, AnnouncementFilter, CreateAnnouncementDto, SearchQuery,
    UpdateAnnouncementDto,
};
use super::service::AnnouncementService;

pub fn parse_category(raw: &str) -> Result<AnnouncementCategory, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request(anyhow!("Invalid category")))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/announcements",
    params(AnnouncementFilter),
    responses((status = 200, description = "Unexpired announcements, newest first", body = Vec<Announcement>)),
    tag = "Announcements"
)]
#[instrument(skip(state))]
pub async fn get_announcements(
    State(state): State<AppState>,
    Query(filter): Query<AnnouncementFilter>,
) -> Result<ApiResponse<Vec<Announcement>>, AppError> {
    let announcements = AnnouncementService::list(&state.db, filter).await?;
    Ok(ApiResponse::ok("Announcements fetched successfully", announcements))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/announcements/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Announcements matching the query", body = Vec<Announcement>),
        (status = 400, description = "Search query is required", body = ErrorResponse)
    ),
    tag = "Announcements"
)]
#[instrument(skip(state))]
pub async fn search_announcements(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<ApiResponse<Vec<Announcement>>, AppError> {
    let query = required_text(params.query, "Search query is required")?;
    let announcements = AnnouncementService::search(&state.db, query).await?;
    Ok(ApiResponse::ok("Announcements fetched successfully", announcements))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/announcements/category/{category}",
    params(("category" = String, Path, description = "Academic, Events, Administrative or Emergency")),
    responses(
        (status = 200, description = "Announcements in the category", body = Vec<Announcement>),
        (status = 400, description = "Invalid category", body = ErrorResponse)
    ),
    tag = "Announcements"
)]
#[instrument(skip(state))]
pub async fn get_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<ApiResponse<Vec<Announcement>>, AppError> {
    let category = parse_category(&category)?;
    let announcements = AnnouncementService::list_by_category(&state.db, category).await?;
    Ok(ApiResponse::ok("Announcements fetched successfully", announcements))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement", body = Announcement),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    tag = "Announcements"
)]
#[instrument(skip(state))]
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Announcement>, AppError> {
    let announcement = AnnouncementService::get_announcement(&state.db, id).await?;
    Ok(ApiResponse::ok("Announcement fetched successfully", announcement))
}

/// Publish an announcement
///
/// `send_email` and `send_push` are recorded with the announcement; no
/// notification is dispatched.
#[utoipa::path(
    post,
    path = "/api/v1/campus/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAnnouncementDto>,
) -> Result<ApiResponse<Announcement>, AppError> {
    let announcement =
        AnnouncementService::create(&state.db, auth_user.user_id()?, auth_user.role()?, dto)
            .await?;
    Ok(ApiResponse::created("Announcement created successfully", announcement))
}

#[utoipa::path(
    put,
    path = "/api/v1/campus/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 403, description = "Not the author", body = ErrorResponse)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAnnouncementDto>,
) -> Result<ApiResponse<Announcement>, AppError> {
    let announcement =
        AnnouncementService::update(&state.db, id, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::ok("Announcement updated successfully", announcement))
}

#[utoipa::path(
    delete,
    path = "/api/v1/campus/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    AnnouncementService::delete(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::empty("Announcement deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_rejects_unknown() {
        assert_eq!(
            parse_category("administrative").unwrap(),
            AnnouncementCategory::Administrative
        );
        let err = parse_category("sports").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Invalid category");
    }
}
