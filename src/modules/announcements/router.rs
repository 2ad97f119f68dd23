use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_announcement, delete_announcement, get_announcement, get_announcements,
    get_by_category, search_announcements, update_announcement,
};

/// Reads are public; writes take the caller from the bearer token.
pub fn init_announcements_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_announcements).post(create_announcement))
        .route("/search", get(search_announcements))
        .route("/category/{category}", get(get_by_category))
        .route(
            "/{id}",
            get(get_announcement)
                .put(update_announcement)
                .delete(delete_announcement),
        )
}
