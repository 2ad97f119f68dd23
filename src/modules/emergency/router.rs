use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    cancel_alert, create_alert, get_alert, get_alerts, get_my_alerts, update_alert_status,
};

pub fn init_emergency_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_alerts).post(create_alert))
        .route("/my-alerts", get(get_my_alerts))
        .route("/{id}", get(get_alert))
        .route("/{id}/status", put(update_alert_status))
        .route("/{id}/cancel", put(cancel_alert))
}
