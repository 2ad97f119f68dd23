use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    claim_item, create_item, delete_item, get_items, get_my_items, update_item,
};

pub fn init_lost_found_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_items).post(create_item))
        .route("/my-items", get(get_my_items))
        .route("/{id}/claim", put(claim_item))
        .route("/{id}", put(update_item).delete(delete_item))
}
