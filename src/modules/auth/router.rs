use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{
    admin_login, authority_login, faculty_login, register_admin, student_login,
};

/// Public sign-in routes, one per account table.
pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/admin/register", post(register_admin))
        .route("/student/login", post(student_login))
        .route("/faculty/login", post(faculty_login))
        .route("/authority/login", post(authority_login))
}
