use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::role::{require_admin, require_authority, require_faculty, require_student};
use crate::modules::admin::init_admin_router;
use crate::modules::announcements::init_announcements_router;
use crate::modules::auth::init_auth_router;
use crate::modules::authority::init_authority_router;
use crate::modules::clubs::init_clubs_router;
use crate::modules::emergency::init_emergency_router;
use crate::modules::events::init_event_router;
use crate::modules::faculty::init_faculty_router;
use crate::modules::forum::init_forum_router;
use crate::modules::locations::init_locations_router;
use crate::modules::problems::init_problem_router;
use crate::modules::student::init_student_router;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

// Room for multipart boundaries and text fields around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(init_auth_router())
        .nest(
            "/admin",
            init_admin_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .nest(
            "/authority",
            init_authority_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_authority)),
        )
        .nest(
            "/faculty",
            init_faculty_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_faculty)),
        )
        .nest(
            "/student",
            init_student_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_student))
                // Nested after the gate: forum reads are public.
                .nest("/forum", init_forum_router()),
        )
        .nest("/problem", init_problem_router())
        .nest("/event", init_event_router())
        .nest(
            "/campus",
            Router::new()
                .nest("/clubs", init_clubs_router())
                .nest("/announcements", init_announcements_router())
                .nest("/emergency", init_emergency_router())
                .nest("/locations", init_locations_router()),
        )
}

pub fn init_router(state: AppState) -> Router {
    let body_limit = state.storage_config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api/v1", api_router(&state))
        .nest_service("/uploads", ServeDir::new(&state.storage_config.upload_dir))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
