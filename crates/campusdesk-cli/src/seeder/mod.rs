//! Development data seeding.
//!
//! Every seeded account gets an `@seed.campusdesk.test` email and every seeded
//! domain carries a marker description, so `clear_all` removes only seeded rows.

pub mod accounts;
pub mod classes;
pub mod domains;
pub mod models;

use campusdesk_core::hash_password;
use sqlx::PgPool;
use std::time::Instant;

pub use accounts::AccountTable;
pub use models::{SEED_EMAIL_DOMAIN, SEED_PASSWORD, SeedConfig};

/// Seeds domains, faculty, classes and students, then places students into classes.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding {} accounts...\n", config.total_accounts());

    // One bcrypt hash shared by every seeded account
    let password_hash =
        hash_password(SEED_PASSWORD).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    domains::seed_domains(db, config.domains).await?;

    let faculty_ids =
        accounts::seed_accounts(db, AccountTable::Faculty, config.faculty, &password_hash).await?;
    let class_ids = classes::seed_classes(db, config.classes, &faculty_ids).await?;

    let student_ids =
        accounts::seed_accounts(db, AccountTable::Students, config.students, &password_hash)
            .await?;
    classes::enroll_students(db, &student_ids, &class_ids).await?;

    println!("\n✅ Seeding completed in {:?}", start_time.elapsed());
    println!("   Password for every seeded account: {}", SEED_PASSWORD);
    Ok(())
}

/// Removes seeded rows. Admins and hand-made accounts are left alone.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let classes = classes::clear_classes(db, &pattern).await?;
    let students = accounts::clear_accounts(db, AccountTable::Students).await?;
    let faculty = accounts::clear_accounts(db, AccountTable::Faculty).await?;
    let domains = domains::clear_domains(db).await?;

    println!(
        "   ✓ Deleted {} classes, {} students, {} faculty, {} domains in {:?}",
        classes,
        students,
        faculty,
        domains,
        start_time.elapsed()
    );
    Ok(())
}
