use anyhow::anyhow;
use axum::extract::{Multipart, Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::multipart::{MultipartForm, image_from_form};
use crate::validator::ValidatedJson;

use super::model::{
    LostFoundCategory, LostFoundFilter, LostFoundItem, NewLostFoundItem, UpdateLostFoundDto,
};
use super::service::LostFoundService;

fn item_from_form(form: &MultipartForm) -> Result<NewLostFoundItem, AppError> {
    let missing = || AppError::bad_request(anyhow!("All fields are required"));
    let field = |name: &str| form.text(name).ok_or_else(missing);

    Ok(NewLostFoundItem {
        title: field("title")?,
        description: field("description")?,
        category: form
            .parse::<LostFoundCategory>("category", "Invalid category")?
            .ok_or_else(missing)?,
        item_type: field("item_type")?,
        location: field("location")?,
        contact_phone: field("contact_phone")?,
        contact_email: field("contact_email")?,
        image: None,
    })
}

/// Report a lost, found or forgotten item
///
/// Multipart fields: `title`, `description`, `category`, `item_type`,
/// `location`, `contact_phone`, `contact_email` and an optional `image`.
#[utoipa::path(
    post,
    path = "/api/v1/student/lost-found",
    request_body(content_type = "multipart/form-data", description = "Item report"),
    responses(
        (status = 201, description = "Item reported", body = LostFoundItem),
        (status = 400, description = "All fields are required", body = ErrorResponse)
    ),
    tag = "Lost & Found",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn create_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<LostFoundItem>, AppError> {
    let mut form = MultipartForm::collect(multipart).await?;
    let mut item = item_from_form(&form)?;
    item.image = image_from_form(state.storage.as_ref(), "lost-found", &mut form).await?;

    let item = LostFoundService::create(&state.db, auth_user.user_id()?, item).await?;
    Ok(ApiResponse::created("Item reported successfully", item))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/lost-found",
    params(LostFoundFilter),
    responses((status = 200, description = "Items, newest first", body = Vec<LostFoundItem>)),
    tag = "Lost & Found",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_items(
    State(state): State<AppState>,
    Query(filter): Query<LostFoundFilter>,
) -> Result<ApiResponse<Vec<LostFoundItem>>, AppError> {
    let items = LostFoundService::list(&state.db, filter).await?;
    Ok(ApiResponse::ok("Items fetched successfully", items))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/lost-found/my-items",
    responses((status = 200, description = "Items I reported", body = Vec<LostFoundItem>)),
    tag = "Lost & Found",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_items(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<LostFoundItem>>, AppError> {
    let items = LostFoundService::list_for_student(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Items fetched successfully", items))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/lost-found/{id}/claim",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item claimed", body = LostFoundItem),
        (status = 400, description = "Item is not available for claiming", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    ),
    tag = "Lost & Found",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn claim_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<LostFoundItem>, AppError> {
    let item = LostFoundService::claim(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Item claimed successfully", item))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/lost-found/{id}",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = UpdateLostFoundDto,
    responses(
        (status = 200, description = "Item updated", body = LostFoundItem),
        (status = 403, description = "Not the reporter", body = ErrorResponse)
    ),
    tag = "Lost & Found",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateLostFoundDto>,
) -> Result<ApiResponse<LostFoundItem>, AppError> {
    let item = LostFoundService::update(&state.db, id, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::ok("Item updated successfully", item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/student/lost-found/{id}",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 403, description = "Not the reporter", body = ErrorResponse)
    ),
    tag = "Lost & Found",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    LostFoundService::delete(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::empty("Item deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> Vec<(&'static str, &'static str)> {
        vec![
            ("title", "Blue umbrella"),
            ("description", "Left near the library"),
            ("category", "lost"),
            ("item_type", "Umbrella"),
            ("location", "Library"),
            ("contact_phone", "5550100"),
            ("contact_email", "owner@campus.edu"),
        ]
    }

    #[test]
    fn test_item_from_form_reads_every_field() {
        let form = MultipartForm::from_pairs(&full_form());
        let item = item_from_form(&form).unwrap();
        assert_eq!(item.category, LostFoundCategory::Lost);
        assert_eq!(item.location, "Library");
        assert!(item.image.is_none());
    }

    #[test]
    fn test_item_from_form_requires_contact_details() {
        let pairs: Vec<_> = full_form()
            .into_iter()
            .filter(|(name, _)| *name != "contact_phone")
            .collect();
        let err = item_from_form(&MultipartForm::from_pairs(&pairs)).unwrap_err();
        assert_eq!(err.error.to_string(), "All fields are required");
    }

    #[test]
    fn test_item_from_form_rejects_unknown_category() {
        let pairs: Vec<_> = full_form()
            .into_iter()
            .map(|(name, value)| if name == "category" { (name, "stolen") } else { (name, value) })
            .collect();
        let err = item_from_form(&MultipartForm::from_pairs(&pairs)).unwrap_err();
        assert_eq!(err.error.to_string(), "Invalid category");
    }
}
