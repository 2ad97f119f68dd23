use anyhow::anyhow;
use axum::extract::{Multipart, Path, Query, State};
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::multipart::{MultipartForm, image_from_form};
use crate::validator::{JsonBody, ValidatedJson};

use super::model::{
    ItemCondition, MarkSoldDto, MarketplaceFilter, MarketplaceItem, NewMarketplaceItem,
    UpdateMarketplaceItemDto,
};
use super::service::MarketplaceService;

fn listing_from_form(form: &MultipartForm) -> Result<NewMarketplaceItem, AppError> {
    let missing = || AppError::bad_request(anyhow!("All fields are required"));
    let field = |name: &str| form.text(name).ok_or_else(missing);

    let price = form
        .parse::<f64>("price", "Invalid price")?
        .ok_or_else(missing)?;
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::bad_request(anyhow!("Invalid price")));
    }

    Ok(NewMarketplaceItem {
        title: field("title")?,
        description: field("description")?,
        category: field("category")?,
        price,
        condition: form
            .parse::<ItemCondition>("condition", "Invalid condition")?
            .ok_or_else(missing)?,
        contact_phone: field("contact_phone")?,
        contact_email: field("contact_email")?,
        image: None,
    })
}

/// List an item for sale
///
/// Multipart fields: `title`, `description`, `category`, `price`,
/// `condition`, `contact_phone`, `contact_email` and an optional `image`.
#[utoipa::path(
    post,
    path = "/api/v1/student/marketplace",
    request_body(content_type = "multipart/form-data", description = "Listing"),
    responses(
        (status = 201, description = "Item listed", body = MarketplaceItem),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse)
    ),
    tag = "Marketplace",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn create_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<MarketplaceItem>, AppError> {
    let mut form = MultipartForm::collect(multipart).await?;
    let mut item = listing_from_form(&form)?;
    item.image = image_from_form(state.storage.as_ref(), "marketplace", &mut form).await?;

    let item = MarketplaceService::create(&state.db, auth_user.user_id()?, item).await?;
    Ok(ApiResponse::created("Item listed successfully", item))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/marketplace",
    params(MarketplaceFilter),
    responses((status = 200, description = "Listings, newest first", body = Vec<MarketplaceItem>)),
    tag = "Marketplace",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_items(
    State(state): State<AppState>,
    Query(filter): Query<MarketplaceFilter>,
) -> Result<ApiResponse<Vec<MarketplaceItem>>, AppError> {
    let items = MarketplaceService::list(&state.db, filter).await?;
    Ok(ApiResponse::ok("Items fetched successfully", items))
}

#[utoipa::path(
    get,
    path = "/api/v1/student/marketplace/my-items",
    responses((status = 200, description = "My listings", body = Vec<MarketplaceItem>)),
    tag = "Marketplace",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_items(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<MarketplaceItem>>, AppError> {
    let items = MarketplaceService::list_for_seller(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Items fetched successfully", items))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/marketplace/{id}/sold",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = MarkSoldDto,
    responses(
        (status = 200, description = "Item marked as sold", body = MarketplaceItem),
        (status = 403, description = "Not the seller", body = ErrorResponse)
    ),
    tag = "Marketplace",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn mark_sold(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<JsonBody<MarkSoldDto>>,
) -> Result<ApiResponse<MarketplaceItem>, AppError> {
    let dto = body.map(|JsonBody(dto)| dto).unwrap_or_default();
    let item = MarketplaceService::mark_sold(&state.db, id, auth_user.user_id()?, dto.buyer_id).await?;
    Ok(ApiResponse::ok("Item marked as sold", item))
}

#[utoipa::path(
    put,
    path = "/api/v1/student/marketplace/{id}",
    params(("id" = Uuid, Path, description = "Item ID")),
    request_body = UpdateMarketplaceItemDto,
    responses(
        (status = 200, description = "Listing updated", body = MarketplaceItem),
        (status = 403, description = "Not the seller", body = ErrorResponse)
    ),
    tag = "Marketplace",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateMarketplaceItemDto>,
) -> Result<ApiResponse<MarketplaceItem>, AppError> {
    let item = MarketplaceService::update(&state.db, id, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::ok("Item updated successfully", item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/student/marketplace/{id}",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Listing removed"),
        (status = 403, description = "Not the seller", body = ErrorResponse)
    ),
    tag = "Marketplace",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    MarketplaceService::delete(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::empty("Item deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(price: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![
            ("title", "Calculus textbook"),
            ("description", "Barely used"),
            ("category", "Books"),
            ("price", price),
            ("condition", "like-new"),
            ("contact_phone", "5550100"),
            ("contact_email", "seller@campus.edu"),
        ]
    }

    #[test]
    fn test_listing_from_form_parses_price_and_condition() {
        let item = listing_from_form(&MultipartForm::from_pairs(&pairs("25.50"))).unwrap();
        assert_eq!(item.price, 25.5);
        assert_eq!(item.condition, ItemCondition::LikeNew);
    }

    #[test]
    fn test_listing_from_form_rejects_negative_price() {
        let err = listing_from_form(&MultipartForm::from_pairs(&pairs("-1"))).unwrap_err();
        assert_eq!(err.error.to_string(), "Invalid price");
    }

    #[test]
    fn test_listing_from_form_rejects_unparseable_price() {
        let err = listing_from_form(&MultipartForm::from_pairs(&pairs("cheap"))).unwrap_err();
        assert_eq!(err.error.to_string(), "Invalid price");
    }
}
