use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::{
    MarketplaceFilter, MarketplaceItem, NewMarketplaceItem, UpdateMarketplaceItemDto,
};

const ITEM_SELECT: &str = r#"
    SELECT m.id, m.title, m.description, m.category, m.price, m.image, m.condition,
           m.seller_id, s.name AS seller_name, s.email AS seller_email,
           m.buyer_id, b.name AS buyer_name,
           m.status, m.contact_phone, m.contact_email, m.sale_date,
           m.created_at, m.updated_at
    FROM marketplace_items m
    JOIN students s ON s.id = m.seller_id
    LEFT JOIN students b ON b.id = m.buyer_id
"#;

fn item_not_found() -> AppError {
    AppError::not_found(anyhow!("Item not found"))
}

pub struct MarketplaceService;

impl MarketplaceService {
    #[instrument(skip(db, item), fields(db.operation = "INSERT", db.table = "marketplace_items"))]
    pub async fn create(
        db: &PgPool,
        seller_id: Uuid,
        item: NewMarketplaceItem,
    ) -> Result<MarketplaceItem, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO marketplace_items
                (title, description, category, price, image, condition,
                 seller_id, contact_phone, contact_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.category)
        .bind(item.price)
        .bind(&item.image)
        .bind(item.condition)
        .bind(seller_id)
        .bind(&item.contact_phone)
        .bind(&item.contact_email)
        .fetch_one(db)
        .await?;

        info!(item.id = %id, "Marketplace item listed");
        Self::get_item(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_item(db: &PgPool, item_id: Uuid) -> Result<MarketplaceItem, AppError> {
        sqlx::query_as::<_, MarketplaceItem>(&format!("{ITEM_SELECT} WHERE m.id = $1"))
            .bind(item_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(item_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filter: MarketplaceFilter,
    ) -> Result<Vec<MarketplaceItem>, AppError> {
        let items = sqlx::query_as::<_, MarketplaceItem>(&format!(
            r#"{ITEM_SELECT}
            WHERE ($1::text IS NULL OR m.category = $1)
              AND ($2::item_condition IS NULL OR m.condition = $2)
              AND ($3::listing_status IS NULL OR m.status = $3)
              AND ($4::float8 IS NULL OR m.price >= $4)
              AND ($5::float8 IS NULL OR m.price <= $5)
            ORDER BY m.created_at DESC"#
        ))
        .bind(&filter.category)
        .bind(filter.condition)
        .bind(filter.status)
        .bind(filter.price_min)
        .bind(filter.price_max)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    #[instrument(skip(db))]
    pub async fn list_for_seller(db: &PgPool, seller_id: Uuid) -> Result<Vec<MarketplaceItem>, AppError> {
        let items = sqlx::query_as::<_, MarketplaceItem>(&format!(
            "{ITEM_SELECT} WHERE m.seller_id = $1 ORDER BY m.created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    async fn ensure_seller(db: &PgPool, item_id: Uuid, student_id: Uuid) -> Result<(), AppError> {
        let seller = sqlx::query_scalar::<_, Uuid>(
            "SELECT seller_id FROM marketplace_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(item_not_found)?;

        if seller != student_id {
            warn!(item.id = %item_id, student.id = %student_id, "Marketplace change by non-seller");
            return Err(AppError::forbidden("Forbidden"));
        }
        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "marketplace_items"))]
    pub async fn mark_sold(
        db: &PgPool,
        item_id: Uuid,
        seller_id: Uuid,
        buyer_id: Option<Uuid>,
    ) -> Result<MarketplaceItem, AppError> {
        Self::ensure_seller(db, item_id, seller_id).await?;

        sqlx::query(
            r#"
            UPDATE marketplace_items
            SET status = 'sold', buyer_id = $2, sale_date = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .bind(buyer_id)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow!("Buyer not found"));
            }
            AppError::from(e)
        })?;

        info!(item.id = %item_id, "Marketplace item sold");
        Self::get_item(db, item_id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        item_id: Uuid,
        seller_id: Uuid,
        dto: UpdateMarketplaceItemDto,
    ) -> Result<MarketplaceItem, AppError> {
        Self::ensure_seller(db, item_id, seller_id).await?;

        sqlx::query(
            r#"
            UPDATE marketplace_items
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                condition = COALESCE($5, condition),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.price)
        .bind(dto.condition)
        .execute(db)
        .await?;

        Self::get_item(db, item_id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "marketplace_items"))]
    pub async fn delete(db: &PgPool, item_id: Uuid, seller_id: Uuid) -> Result<(), AppError> {
        Self::ensure_seller(db, item_id, seller_id).await?;

        sqlx::query("DELETE FROM marketplace_items WHERE id = $1")
            .bind(item_id)
            .execute(db)
            .await?;

        info!(item.id = %item_id, "Marketplace item deleted");
        Ok(())
    }
}
