use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use super::model::{CampusLocation, CreateLocationDto, LocationFilter, UpdateLocationDto};

const LOCATION_SELECT: &str = r#"
    SELECT id, name, description, category, latitude, longitude,
           building, floor, image, facilities, created_at, updated_at
    FROM campus_locations
"#;

fn location_not_found() -> AppError {
    AppError::not_found(anyhow!("Location not found"))
}

pub struct LocationService;

impl LocationService {
    #[instrument(skip(db, dto), fields(location.name = %dto.name, db.operation = "INSERT", db.table = "campus_locations"))]
    pub async fn create(db: &PgPool, dto: CreateLocationDto) -> Result<CampusLocation, AppError> {
        let location = sqlx::query_as::<_, CampusLocation>(
            r#"
            INSERT INTO campus_locations
                (name, description, category, latitude, longitude, building, floor, image, facilities)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, description, category, latitude, longitude,
                      building, floor, image, facilities, created_at, updated_at
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.category)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(&dto.building)
        .bind(&dto.floor)
        .bind(&dto.image)
        .bind(&dto.facilities)
        .fetch_one(db)
        .await?;

        info!(location.id = %location.id, "Campus location created");
        Ok(location)
    }

    #[instrument(skip(db))]
    pub async fn get_location(db: &PgPool, id: Uuid) -> Result<CampusLocation, AppError> {
        sqlx::query_as::<_, CampusLocation>(&format!("{LOCATION_SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(location_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, filter: LocationFilter) -> Result<Vec<CampusLocation>, AppError> {
        let locations = sqlx::query_as::<_, CampusLocation>(&format!(
            "{LOCATION_SELECT} WHERE ($1::location_category IS NULL OR category = $1) ORDER BY name"
        ))
        .bind(filter.category)
        .fetch_all(db)
        .await?;
        Ok(locations)
    }

    #[instrument(skip(db))]
    pub async fn search(db: &PgPool, query: &str) -> Result<Vec<CampusLocation>, AppError> {
        let pattern = format!("%{}%", query.trim());
        let locations = sqlx::query_as::<_, CampusLocation>(&format!(
            r#"
            {LOCATION_SELECT}
            WHERE name ILIKE $1 OR description ILIKE $1 OR building ILIKE $1
            ORDER BY name
            "#
        ))
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(locations)
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        dto: UpdateLocationDto,
    ) -> Result<CampusLocation, AppError> {
        sqlx::query_as::<_, CampusLocation>(
            r#"
            UPDATE campus_locations
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                building = COALESCE($7, building),
                floor = COALESCE($8, floor),
                image = COALESCE($9, image),
                facilities = COALESCE($10, facilities),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, category, latitude, longitude,
                      building, floor, image, facilities, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.category)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(&dto.building)
        .bind(&dto.floor)
        .bind(&dto.image)
        .bind(&dto.facilities)
        .fetch_optional(db)
        .await?
        .ok_or_else(location_not_found)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "campus_locations"))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM campus_locations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(location_not_found());
        }

        info!(location.id = %id, "Campus location deleted");
        Ok(())
    }
}
