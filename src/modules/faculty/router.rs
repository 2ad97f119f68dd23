use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    add_bulk_grades, add_discussion, add_grade, add_lecture, add_note, add_reply,
    get_class_details, get_my_classes, mark_attendance,
};

pub fn init_faculty_router() -> Router<AppState> {
    Router::new()
        .route("/my-classes", get(get_my_classes))
        .route("/class/{class_id}", get(get_class_details))
        .route("/class/{class_id}/lecture", post(add_lecture))
        .route("/class/{class_id}/attendance", post(mark_attendance))
        .route("/class/{class_id}/grade", post(add_grade))
        .route("/class/{class_id}/grades/bulk", post(add_bulk_grades))
        .route("/class/{class_id}/note", post(add_note))
        .route("/class/{class_id}/discussion", post(add_discussion))
        .route("/discussion/{discussion_id}/reply", post(add_reply))
}
