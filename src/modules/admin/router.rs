use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    add_authority_to_domain, bulk_create_students, create_authority, create_class, create_domain,
    create_faculty, create_student, delete_authority, delete_class, delete_faculty,
    delete_student, get_authorities, get_classes, get_domain_authorities, get_domains,
    get_faculties, get_students, send_work_report,
};

pub fn init_admin_router() -> Router<AppState> {
    Router::new()
        .route("/create-class", post(create_class))
        .route("/get-classes", get(get_classes))
        .route("/delete-class/{id}", delete(delete_class))
        .route("/create-faculty", post(create_faculty))
        .route("/get-faculties", get(get_faculties))
        .route("/delete-faculty/{id}", delete(delete_faculty))
        .route("/create-student", post(create_student))
        .route("/get-students", get(get_students))
        .route("/delete-student/{id}", delete(delete_student))
        .route("/bulk-create-students", post(bulk_create_students))
        .route("/create-authority", post(create_authority))
        .route("/get-authorities", get(get_authorities))
        .route("/delete-authority/{id}", delete(delete_authority))
        .route("/create-domain", post(create_domain))
        .route("/get-domains", get(get_domains))
        .route("/get-domain-authorities/{domain_id}", get(get_domain_authorities))
        .route("/add-authority-to-domain", post(add_authority_to_domain))
        .route("/send-work-report", post(send_work_report))
}
