use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use campusdesk_core::serde::empty_string_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "forum_category")]
pub enum ForumCategory {
    Academics,
    #[sqlx(rename = "Campus Life")]
    #[serde(rename = "Campus Life")]
    CampusLife,
    Events,
    #[sqlx(rename = "Tech Support")]
    #[serde(rename = "Tech Support")]
    TechSupport,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vote_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

/// What a vote request did to the caller's existing vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    Added,
    Removed,
    Switched,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ForumPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: ForumCategory,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub author_email: String,
    pub flagged: bool,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ForumComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub content: String,
    pub flagged: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForumPostDetail {
    #[serde(flatten)]
    pub post: ForumPost,
    pub comments: Vec<ForumComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoteResult {
    pub outcome: VoteOutcome,
    pub upvotes: i64,
    pub downvotes: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateForumPostDto {
    #[validate(length(min = 1, max = 300, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub category: ForumCategory,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateForumCommentDto {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FlagPostDto {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ForumFilter {
    pub category: Option<ForumCategory>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
}
