use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use campusdesk_core::serde::empty_string_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_condition", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ItemCondition {
    LikeNew,
    Good,
    Fair,
    NeedsRepair,
}

impl std::str::FromStr for ItemCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like-new" => Ok(Self::LikeNew),
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "needs-repair" => Ok(Self::NeedsRepair),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Sold,
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MarketplaceItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub image: Option<String>,
    pub condition: ItemCondition,
    pub seller_id: Uuid,
    pub seller_name: Option<String>,
    pub seller_email: String,
    pub buyer_id: Option<Uuid>,
    pub buyer_name: Option<String>,
    pub status: ListingStatus,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMarketplaceItem {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub condition: ItemCondition,
    pub contact_phone: String,
    pub contact_email: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMarketplaceItemDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub condition: Option<ItemCondition>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MarkSoldDto {
    pub buyer_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct MarketplaceFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    pub condition: Option<ItemCondition>,
    pub status: Option<ListingStatus>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ItemCondition::NeedsRepair).unwrap(),
            "\"needs-repair\""
        );
        assert_eq!("Like-New".parse(), Ok(ItemCondition::LikeNew));
    }

    #[test]
    fn test_negative_price_rejected() {
        let dto = UpdateMarketplaceItemDto {
            title: None,
            description: None,
            price: Some(-5.0),
            condition: None,
        };
        assert!(dto.validate().is_err());
    }
}
