//! Authority domain seeding.

use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

use super::models::{DomainSeed, SEED_DOMAIN_MARKER};

const DOMAIN_NAMES: [&str; 8] = [
    "Hostel",
    "Library",
    "Transport",
    "Mess",
    "IT Services",
    "Sports",
    "Maintenance",
    "Security",
];

/// Generates domain rows. Names past the built-in list get a numeric suffix
/// so every name stays unique.
pub fn generate_domains(count: usize) -> Vec<DomainSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let base = DOMAIN_NAMES[i % DOMAIN_NAMES.len()];
            let name = if i < DOMAIN_NAMES.len() {
                base.to_string()
            } else {
                format!("{} {}", base, i / DOMAIN_NAMES.len() + 1)
            };

            DomainSeed {
                name,
                description: SEED_DOMAIN_MARKER.to_string(),
            }
        })
        .collect()
}

/// Seeds domains, skipping names that already exist.
pub async fn seed_domains(db: &PgPool, count: usize) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏢 Seeding {} domains...", count);

    let domains = generate_domains(count);
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(domains.len());

    for domain in &domains {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO authority_domains (name, description) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING
             RETURNING id",
        )
        .bind(&domain.name)
        .bind(&domain.description)
        .fetch_optional(&mut *tx)
        .await?;
        ids.extend(id);
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} domains in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

pub async fn clear_domains(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let result = sqlx::query("DELETE FROM authority_domains WHERE description = $1")
        .bind(SEED_DOMAIN_MARKER)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_domain_names_are_unique() {
        let domains = generate_domains(20);
        let names: HashSet<_> = domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), 20);
        assert!(names.contains("Hostel"));
        assert!(names.contains("Hostel 2"));
    }
}
