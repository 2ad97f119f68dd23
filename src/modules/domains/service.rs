use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::model::{
    AuthorityDomain, CreateDomainDto, DomainDetail, DomainMember, DomainSummary, DomainWithStats,
    UpdateDomainDto,
};

pub struct DomainService;

fn map_domain_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow!("Domain already exists"));
    }
    error!(error = %e, "Database error writing domain");
    AppError::from(e)
}

impl DomainService {
    #[instrument(skip(db, dto), fields(domain.name = %dto.name, db.operation = "INSERT", db.table = "authority_domains"))]
    pub async fn create_domain(db: &PgPool, dto: CreateDomainDto) -> Result<AuthorityDomain, AppError> {
        let domain = sqlx::query_as::<_, AuthorityDomain>(
            r#"
            INSERT INTO authority_domains (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(map_domain_write_error)?;

        info!(domain.id = %domain.id, "Domain created");
        Ok(domain)
    }

    /// Creates a domain and makes `authority_id` its first member.
    #[instrument(skip(db, dto), fields(domain.name = %dto.name))]
    pub async fn create_domain_for_authority(
        db: &PgPool,
        authority_id: Uuid,
        dto: CreateDomainDto,
    ) -> Result<AuthorityDomain, AppError> {
        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let domain = sqlx::query_as::<_, AuthorityDomain>(
            r#"
            INSERT INTO authority_domains (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(&dto.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_domain_write_error)?;

        sqlx::query("UPDATE authorities SET domain_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(domain.id)
            .bind(authority_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(domain.id = %domain.id, authority.id = %authority_id, "Domain created by authority");
        Ok(domain)
    }

    #[instrument(skip(db))]
    pub async fn list_domains(db: &PgPool) -> Result<Vec<AuthorityDomain>, AppError> {
        let domains = sqlx::query_as::<_, AuthorityDomain>(
            "SELECT id, name, description, created_at, updated_at FROM authority_domains ORDER BY name",
        )
        .fetch_all(db)
        .await?;
        Ok(domains)
    }

    #[instrument(skip(db))]
    pub async fn list_domains_with_stats(db: &PgPool) -> Result<Vec<DomainWithStats>, AppError> {
        let domains = sqlx::query_as::<_, DomainWithStats>(
            r#"
            SELECT d.id, d.name, d.description, d.created_at,
                   COUNT(a.id) AS authority_count
            FROM authority_domains d
            LEFT JOIN authorities a ON a.domain_id = d.id
            GROUP BY d.id
            ORDER BY d.created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(domains)
    }

    #[instrument(skip(db))]
    pub async fn list_domain_summaries(db: &PgPool) -> Result<Vec<DomainSummary>, AppError> {
        let domains = sqlx::query_as::<_, DomainSummary>(
            "SELECT id, name, description FROM authority_domains ORDER BY name",
        )
        .fetch_all(db)
        .await?;
        Ok(domains)
    }

    #[instrument(skip(db))]
    pub async fn get_domain(db: &PgPool, domain_id: Uuid) -> Result<AuthorityDomain, AppError> {
        sqlx::query_as::<_, AuthorityDomain>(
            "SELECT id, name, description, created_at, updated_at FROM authority_domains WHERE id = $1",
        )
        .bind(domain_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Domain not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_domain_detail(db: &PgPool, domain_id: Uuid) -> Result<DomainDetail, AppError> {
        let domain = Self::get_domain(db, domain_id).await?;
        let authorities = Self::members(db, domain_id).await?;
        Ok(DomainDetail {
            domain,
            authorities,
        })
    }

    /// Authorities whose `domain_id` points at this domain.
    #[instrument(skip(db))]
    pub async fn members(db: &PgPool, domain_id: Uuid) -> Result<Vec<DomainMember>, AppError> {
        let members = sqlx::query_as::<_, DomainMember>(
            r#"
            SELECT id, name, email, department
            FROM authorities
            WHERE domain_id = $1
            ORDER BY name
            "#,
        )
        .bind(domain_id)
        .fetch_all(db)
        .await?;
        Ok(members)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_domain(
        db: &PgPool,
        domain_id: Uuid,
        dto: UpdateDomainDto,
    ) -> Result<AuthorityDomain, AppError> {
        let domain = sqlx::query_as::<_, AuthorityDomain>(
            r#"
            UPDATE authority_domains
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(domain_id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.description)
        .fetch_optional(db)
        .await
        .map_err(map_domain_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Domain not found")))?;

        info!(domain.id = %domain.id, "Domain updated");
        Ok(domain)
    }

    /// Members keep their accounts; their `domain_id` is cleared by the
    /// foreign key. A domain that still has complaints cannot be deleted.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "authority_domains"))]
    pub async fn delete_domain(db: &PgPool, domain_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM authority_domains WHERE id = $1")
            .bind(domain_id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    warn!(domain.id = %domain_id, "Domain still has complaints");
                    return AppError::bad_request(anyhow!("Domain still has complaints"));
                }
                error!(error = %e, "Database error deleting domain");
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            debug!(domain.id = %domain_id, "Domain not found for deletion");
            return Err(AppError::not_found(anyhow!("Domain not found")));
        }

        info!(domain.id = %domain_id, "Domain deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn add_authority_to_domain(
        db: &PgPool,
        authority_id: Uuid,
        domain_id: Uuid,
    ) -> Result<DomainDetail, AppError> {
        Self::get_domain(db, domain_id).await?;

        let result = sqlx::query(
            "UPDATE authorities SET domain_id = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(domain_id)
        .bind(authority_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Authority not found")));
        }

        info!(authority.id = %authority_id, domain.id = %domain_id, "Authority added to domain");
        Self::get_domain_detail(db, domain_id).await
    }

    /// The authority's domain as currently stored, not as recorded in its token.
    #[instrument(skip(db))]
    pub async fn current_domain_of(db: &PgPool, authority_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let domain_id = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT domain_id FROM authorities WHERE id = $1",
        )
        .bind(authority_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Authority not found")))?;
        Ok(domain_id)
    }
}
