use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    add_announcement, add_gallery_image, approve_request, create_club, create_club_event,
    get_club, get_clubs, get_requests, join_club, leave_club, reject_request, update_club,
};

pub fn init_clubs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_clubs).post(create_club))
        .route("/{id}", get(get_club).put(update_club))
        .route("/{id}/join", post(join_club))
        .route("/{id}/leave", post(leave_club))
        .route("/{id}/announcement", post(add_announcement))
        .route("/{id}/gallery", post(add_gallery_image))
        .route("/{id}/requests", get(get_requests))
        .route("/{id}/approve/{student_id}", post(approve_request))
        .route("/{id}/reject/{student_id}", post(reject_request))
        .route("/{id}/event", post(create_club_event))
}
