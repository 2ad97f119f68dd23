use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_problem, get_all_problems, get_domain_problems, get_problems_by_domain,
    get_student_problems, update_problem,
};

/// Role checks happen in the handlers; `domain/{domain_id}/problems` is public.
pub fn init_problem_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_problem))
        .route("/student/problems", get(get_student_problems))
        .route("/domain/problems", get(get_domain_problems))
        .route("/domain/{domain_id}/problems", get(get_problems_by_domain))
        .route("/update/{id}", patch(update_problem))
        .route("/all", get(get_all_problems))
}
