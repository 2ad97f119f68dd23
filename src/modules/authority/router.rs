use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

use super::controller::{
    accept_complaint, create_domain, delete_domain, get_all_domains, get_assigned_complaints,
    get_colleagues, get_complaints, get_domain, get_my_domain, get_stats, transfer_complaint,
    update_complaint_status, update_domain,
};

pub fn init_authority_router() -> Router<AppState> {
    Router::new()
        .route("/complaints", get(get_complaints))
        .route("/complaints/{id}/accept", post(accept_complaint))
        .route("/complaints/{id}/transfer", post(transfer_complaint))
        .route("/complaints/{id}/status", put(update_complaint_status))
        .route("/assigned-complaints", get(get_assigned_complaints))
        .route("/stats", get(get_stats))
        .route("/colleagues", get(get_colleagues))
        .route("/domain/create", post(create_domain))
        .route("/domain/all", get(get_all_domains))
        .route("/domain/my", get(get_my_domain))
        .route("/domain/{id}", get(get_domain))
        .route("/domain/{id}/update", put(update_domain))
        .route("/domain/{id}/delete", delete(delete_domain))
}
