use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::lost_found::init_lost_found_router;
use crate::modules::marketplace::init_marketplace_router;
use crate::state::AppState;

use super::controller::{
    add_discussion, add_note, add_past_paper, add_reply, enroll_class, explore_classes,
    get_class_details, get_domains, get_profile, update_profile,
};

/// Student-only routes, including the lost & found board and marketplace.
pub fn init_student_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/get-domains", get(get_domains))
        .route("/explore-classes", get(explore_classes))
        .route("/enroll-class", post(enroll_class))
        .route("/class/{class_id}", get(get_class_details))
        .route("/class/{class_id}/note", post(add_note))
        .route("/class/{class_id}/past-paper", post(add_past_paper))
        .route("/class/{class_id}/discussion", post(add_discussion))
        .route("/discussion/{discussion_id}/reply", post(add_reply))
        .nest("/lost-found", init_lost_found_router())
        .nest("/marketplace", init_marketplace_router())
}
