use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    create_item, delete_item, get_items, get_my_items, mark_sold, update_item,
};

pub fn init_marketplace_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_items).post(create_item))
        .route("/my-items", get(get_my_items))
        .route("/{id}/sold", put(mark_sold))
        .route("/{id}", put(update_item).delete(delete_item))
}
