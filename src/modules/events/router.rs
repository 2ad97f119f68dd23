use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_event, delete_event, get_all_events, get_event, get_faculty_events,
    get_student_events, register_for_event, unregister_from_event, update_event,
};

/// Each handler checks the caller's role through its extractor.
pub fn init_event_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_event))
        .route("/faculty/events", get(get_faculty_events))
        .route("/update/{id}", patch(update_event))
        .route("/delete/{id}", delete(delete_event))
        .route("/student/events", get(get_student_events))
        .route("/register/{id}", post(register_for_event))
        .route("/unregister/{id}", post(unregister_from_event))
        .route("/all", get(get_all_events))
        .route("/{id}", get(get_event))
}
