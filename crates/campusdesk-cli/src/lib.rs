//! # CampusDesk CLI
//!
//! Admin provisioning and database seeding for development.
//!
//! ```ignore
//! use campusdesk_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::default().with_domains(4);
//! seed_all(&pool, config).await?;
//! ```

pub mod admin;
pub mod seeder;
