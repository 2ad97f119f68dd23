use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    add_comment, create_post, delete_post, downvote_post, flag_post, get_post, get_posts,
    upvote_post,
};

/// Reads are public; writes check for a student token in the handler.
pub fn init_forum_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_posts).post(create_post))
        .route("/{id}", get(get_post).delete(delete_post))
        .route("/{id}/upvote", put(upvote_post))
        .route("/{id}/downvote", put(downvote_post))
        .route("/{id}/comment", post(add_comment))
        .route("/{id}/flag", put(flag_post))
}
