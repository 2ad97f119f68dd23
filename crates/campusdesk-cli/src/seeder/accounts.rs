//! Faculty and student account seeding.

use fake::Fake;
use fake::faker::name::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{AccountSeed, SEED_EMAIL_DOMAIN};

/// Generates `count` accounts with emails like `jane.doe+student12@seed.campusdesk.test`.
pub fn generate_accounts(count: usize, role_prefix: &str, password_hash: &str) -> Vec<AccountSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();

            let email = format!(
                "{}.{}+{}{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                role_prefix,
                idx,
                SEED_EMAIL_DOMAIN
            );

            AccountSeed {
                name: format!("{} {}", first_name, last_name),
                email,
                password_hash: password_hash.to_string(),
            }
        })
        .collect()
}

/// Account tables that share the `(name, email, password)` column layout.
#[derive(Clone, Copy)]
pub enum AccountTable {
    Faculty,
    Students,
}

impl AccountTable {
    fn as_str(self) -> &'static str {
        match self {
            AccountTable::Faculty => "faculty",
            AccountTable::Students => "students",
        }
    }
}

pub async fn seed_accounts(
    db: &PgPool,
    table: AccountTable,
    count: usize,
    password_hash: &str,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("👥 Seeding {} {} accounts...", count, table.as_str());

    let prefix = match table {
        AccountTable::Faculty => "faculty",
        AccountTable::Students => "student",
    };
    let accounts = generate_accounts(count, prefix, password_hash);

    let mut tx = db.begin().await?;

    // 3 params per account
    const BATCH_SIZE: usize = 1000;
    let mut ids = Vec::with_capacity(accounts.len());
    for chunk in accounts.chunks(BATCH_SIZE) {
        ids.extend(insert_accounts_chunk(&mut tx, table, chunk).await?);
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} {} in {:?}",
        ids.len(),
        table.as_str(),
        start_time.elapsed()
    );

    Ok(ids)
}

async fn insert_accounts_chunk(
    tx: &mut Transaction<'_, Postgres>,
    table: AccountTable,
    accounts: &[AccountSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if accounts.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = format!("INSERT INTO {} (name, email, password) VALUES ", table.as_str());
    for i in 0..accounts.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 3;
        query.push_str(&format!(
            "(${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3
        ));
    }
    query.push_str(" ON CONFLICT (email) DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar::<_, Uuid>(&query);
    for account in accounts {
        q = q
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.password_hash);
    }

    let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

pub async fn clear_accounts(
    db: &PgPool,
    table: AccountTable,
) -> Result<u64, Box<dyn std::error::Error>> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE email LIKE $1",
        table.as_str()
    ))
    .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
    .execute(db)
    .await?
    .rows_affected();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_accounts_use_seed_domain() {
        let accounts = generate_accounts(5, "student", "hash");
        assert_eq!(accounts.len(), 5);
        for (idx, account) in accounts.iter().enumerate() {
            assert!(account.email.ends_with(SEED_EMAIL_DOMAIN));
            assert!(account.email.contains(&format!("+student{}@", idx)));
            assert_eq!(account.password_hash, "hash");
        }
    }
}
