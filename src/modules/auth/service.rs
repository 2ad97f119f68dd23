use anyhow::anyhow;
use campusdesk_auth::{Role, create_access_token};
use campusdesk_config::{JwtConfig, ServerConfig};
use campusdesk_core::{AppError, hash_password, verify_password};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::track_login;

use super::model::{AccountCredentials, AccountSummary, Admin, LoginRequest, LoginResponse, RegisterAdminDto};

pub struct AuthService;

/// Credential lookup per account table. Only authorities carry a domain in
/// their token.
fn credentials_query(role: Role) -> &'static str {
    match role {
        Role::Admin => {
            "SELECT id, name, email, password, NULL::uuid AS domain_id FROM admins WHERE email = $1"
        }
        Role::Faculty => {
            "SELECT id, name, email, password, NULL::uuid AS domain_id FROM faculty WHERE email = $1"
        }
        Role::Student => {
            "SELECT id, name, email, password, NULL::uuid AS domain_id FROM students WHERE email = $1"
        }
        Role::Authority => {
            "SELECT id, name, email, password, domain_id FROM authorities WHERE email = $1"
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(auth.role = %role, auth.email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        role: Role,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = normalize_email(&dto.email);

        let account = sqlx::query_as::<_, AccountCredentials>(credentials_query(role))
            .bind(&email)
            .fetch_optional(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error looking up account");
                AppError::from(e)
            })?
            .ok_or_else(|| {
                debug!("No account with this email");
                track_login(role.as_str(), false);
                AppError::not_found(anyhow!("{} not found", role))
            })?;

        if !verify_password(&dto.password, &account.password)? {
            warn!(user.id = %account.id, "Invalid password");
            track_login(role.as_str(), false);
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let name = account.name.clone().unwrap_or_default();
        let token = create_access_token(
            account.id,
            &name,
            &account.email,
            role,
            account.domain_id,
            jwt_config,
        )?;

        track_login(role.as_str(), true);
        info!(user.id = %account.id, "Login successful");

        Ok(LoginResponse {
            token,
            user: AccountSummary {
                id: account.id,
                name: account.name,
                email: account.email,
                role,
                domain: account.domain_id,
            },
        })
    }

    #[instrument(skip(db, dto), fields(admin.email = %dto.email, db.operation = "INSERT", db.table = "admins"))]
    pub async fn register_admin(db: &PgPool, dto: RegisterAdminDto) -> Result<Admin, AppError> {
        let hashed = hash_password(&dto.password)?;

        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(normalize_email(&dto.email))
        .bind(hashed)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow!("Admin already exists"));
            }
            error!(error = %e, "Database error creating admin");
            AppError::from(e)
        })?;

        info!(admin.id = %admin.id, "Admin registered");
        Ok(admin)
    }

    /// Creates the bootstrap admin from `DEFAULT_ADMIN_*` unless an admin
    /// with that email already exists. Returns whether a row was inserted.
    #[instrument(skip(db, config))]
    pub async fn ensure_default_admin(db: &PgPool, config: &ServerConfig) -> Result<bool, AppError> {
        let email = normalize_email(&config.default_admin_email);

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE email = $1)",
        )
        .bind(&email)
        .fetch_one(db)
        .await?;

        if exists {
            debug!("Default admin already present");
            return Ok(false);
        }

        let hashed = hash_password(&config.default_admin_password)?;
        let result = sqlx::query(
            r#"
            INSERT INTO admins (name, email, password)
            VALUES ('Admin', $1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&email)
        .bind(hashed)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            warn!(admin.email = %email, "Default admin not created: name or email already taken");
            return Ok(false);
        }

        info!(admin.email = %email, "Default admin created");
        Ok(true)
    }
}
