//! Admin account provisioning.

use campusdesk_core::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

/// Inserts an admin account. Fails when the name or email is taken.
pub async fn create_admin(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    let email = email.trim().to_lowercase();
    if name.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err("Name, email and password are required".into());
    }

    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO admins (name, email, password)
         VALUES ($1, $2, $3)
         ON CONFLICT DO NOTHING
         RETURNING id",
    )
    .bind(name.trim())
    .bind(&email)
    .bind(&hashed_password)
    .fetch_optional(db)
    .await?;

    id.ok_or_else(|| "An admin with this name or email already exists".into())
}
