use axum::extract::{Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::role::RequireAdmin;
use crate::state::AppState;
use crate::validator::{ValidatedJson, required_text};

use super::model::{
    CampusLocation, CreateLocationDto, LocationFilter, LocationSearch, UpdateLocationDto,
};
use super::service::LocationService;

#[utoipa::path(
    get,
    path = "/api/v1/campus/locations",
    params(LocationFilter),
    responses((status = 200, description = "Campus locations", body = Vec<CampusLocation>)),
    tag = "Campus Map"
)]
#[instrument(skip(state))]
pub async fn get_locations(
    State(state): State<AppState>,
    Query(filter): Query<LocationFilter>,
) -> Result<ApiResponse<Vec<CampusLocation>>, AppError> {
    let locations = LocationService::list(&state.db, filter).await?;
    Ok(ApiResponse::ok("Locations fetched successfully", locations))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/locations/search",
    params(LocationSearch),
    responses(
        (status = 200, description = "Locations matching name, description or building", body = Vec<CampusLocation>),
        (status = 400, description = "Search query is required", body = ErrorResponse)
    ),
    tag = "Campus Map"
)]
#[instrument(skip(state))]
pub async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<LocationSearch>,
) -> Result<ApiResponse<Vec<CampusLocation>>, AppError> {
    let query = required_text(params.query, "Search query is required")?;
    let locations = LocationService::search(&state.db, &query).await?;
    Ok(ApiResponse::ok("Locations fetched successfully", locations))
}

#[utoipa::path(
    get,
    path = "/api/v1/campus/locations/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location", body = CampusLocation),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "Campus Map"
)]
#[instrument(skip(state))]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<CampusLocation>, AppError> {
    let location = LocationService::get_location(&state.db, id).await?;
    Ok(ApiResponse::ok("Location fetched successfully", location))
}

#[utoipa::path(
    post,
    path = "/api/v1/campus/locations",
    request_body = CreateLocationDto,
    responses(
        (status = 201, description = "Location created", body = CampusLocation),
        (status = 400, description = "Coordinates out of range", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Campus Map",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin, dto))]
pub async fn create_location(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateLocationDto>,
) -> Result<ApiResponse<CampusLocation>, AppError> {
    let location = LocationService::create(&state.db, dto).await?;
    Ok(ApiResponse::created("Location created successfully", location))
}

#[utoipa::path(
    put,
    path = "/api/v1/campus/locations/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = UpdateLocationDto,
    responses(
        (status = 200, description = "Location updated", body = CampusLocation),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "Campus Map",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin, dto))]
pub async fn update_location(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateLocationDto>,
) -> Result<ApiResponse<CampusLocation>, AppError> {
    let location = LocationService::update(&state.db, id, dto).await?;
    Ok(ApiResponse::ok("Location updated successfully", location))
}

#[utoipa::path(
    delete,
    path = "/api/v1/campus/locations/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location deleted"),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "Campus Map",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn delete_location(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    LocationService::delete(&state.db, id).await?;
    Ok(ApiResponse::empty("Location deleted successfully"))
}
