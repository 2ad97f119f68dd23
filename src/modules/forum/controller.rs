use axum::extract::{Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::role::RequireStudent;
use crate::state::AppState;
use crate::validator::{JsonBody, ValidatedJson, required_text};

use super::model::{
    CreateForumCommentDto, CreateForumPostDto, FlagPostDto, ForumComment, ForumFilter, ForumPost,
    ForumPostDetail, VoteKind, VoteResult,
};
use super::service::ForumService;

#[utoipa::path(
    get,
    path = "/api/v1/student/forum",
    params(ForumFilter),
    responses((status = 200, description = "Unflagged posts with vote and comment counts", body = Vec<ForumPost>)),
    tag = "Forum"
)]
#[instrument(skip(state))]
pub async fn get_posts(
    State(state): State<AppState>,
    Query(filter): Query<ForumFilter>,
) -> Result<ApiResponse<Vec<ForumPost>>, AppError> {
    let posts = ForumService::list_posts(&state.db, filter).await?;
    Ok(ApiResponse::ok("Posts fetched successfully", posts))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/forum/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with comments", body = ForumPostDetail),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "Forum"
)]
#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ForumPostDetail>, AppError> {
    let post = ForumService::get_post_detail(&state.db, id).await?;
    Ok(ApiResponse::ok("Post fetched successfully", post))
}

#[utoipa::path(
    post,
    path = "/api/v1/student/forum",
    request_body = CreateForumPostDto,
    responses(
        (status = 201, description = "Post created", body = ForumPost),
        (status = 403, description = "Students only", body = ErrorResponse)
    ),
    tag = "Forum",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_post(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    ValidatedJson(dto): ValidatedJson<CreateForumPostDto>,
) -> Result<ApiResponse<ForumPost>, AppError> {
    let post = ForumService::create_post(&state.db, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::created("Post created successfully", post))
}

#[utoipa::path(
    delete,
    path = "/api/v1/student/forum/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse)
    ),
    tag = "Forum",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    ForumService::delete_post(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::empty("Post deleted successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/forum/{id}/upvote",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses((status = 200, description = "Vote added, removed or switched", body = VoteResult)),
    tag = "Forum",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn upvote_post(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<VoteResult>, AppError> {
    let result = ForumService::vote(&state.db, id, auth_user.user_id()?, VoteKind::Up).await?;
    Ok(ApiResponse::ok("Vote recorded", result))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/forum/{id}/downvote",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses((status = 200, description = "Vote added, removed or switched", body = VoteResult)),
    tag = "Forum",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn downvote_post(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<VoteResult>, AppError> {
    let result = ForumService::vote(&state.db, id, auth_user.user_id()?, VoteKind::Down).await?;
    Ok(ApiResponse::ok("Vote recorded", result))
}

#[utoipa::path(
    post,
    path = "/api/v1/student/forum/{id}/comment",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateForumCommentDto,
    responses(
        (status = 201, description = "Comment added", body = ForumComment),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "Forum",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_comment(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateForumCommentDto>,
) -> Result<ApiResponse<ForumComment>, AppError> {
    let comment =
        ForumService::add_comment(&state.db, id, auth_user.user_id()?, &dto.content).await?;
    Ok(ApiResponse::created("Comment added successfully", comment))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/forum/{id}/flag",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = FlagPostDto,
    responses(
        (status = 200, description = "Post flagged and hidden from listings", body = ForumPost),
        (status = 400, description = "Reason is required", body = ErrorResponse)
    ),
    tag = "Forum",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _student, dto))]
pub async fn flag_post(
    State(state): State<AppState>,
    _student: RequireStudent,
    Path(id): Path<Uuid>,
    JsonBody(dto): JsonBody<FlagPostDto>,
) -> Result<ApiResponse<ForumPost>, AppError> {
    let reason = required_text(dto.reason, "Reason is required")?;
    let post = ForumService::flag_post(&state.db, id, &reason).await?;
    Ok(ApiResponse::ok("Post flagged successfully", post))
}
