use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_location, delete_location, get_location, get_locations, search_locations,
    update_location,
};

pub fn init_locations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_locations).post(create_location))
        .route("/search", get(search_locations))
        .route(
            "/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
}
