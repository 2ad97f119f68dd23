//! Seed row shapes and the seeding configuration.

use uuid::Uuid;

/// Seeded accounts use this email domain so `clear-seed` can find them.
pub const SEED_EMAIL_DOMAIN: &str = "seed.campusdesk.test";

/// Stored as the description of seeded domains.
pub const SEED_DOMAIN_MARKER: &str = "Seeded domain";

pub const SEED_PASSWORD: &str = "password123";

pub struct DomainSeed {
    pub name: String,
    pub description: String,
}

pub struct AccountSeed {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

pub struct ClassSeed {
    pub name: String,
    pub teacher_id: Uuid,
}

#[derive(Clone)]
pub struct SeedConfig {
    pub domains: usize,
    pub faculty: usize,
    pub classes: usize,
    pub students: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            domains: 4,
            faculty: 10,
            classes: 8,
            students: 200,
        }
    }
}

impl SeedConfig {
    pub fn with_domains(mut self, domains: usize) -> Self {
        self.domains = domains;
        self
    }

    pub fn with_faculty(mut self, faculty: usize) -> Self {
        self.faculty = faculty;
        self
    }

    pub fn with_classes(mut self, classes: usize) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_students(mut self, students: usize) -> Self {
        self.students = students;
        self
    }

    /// Accounts created by one run.
    pub fn total_accounts(&self) -> usize {
        self.faculty + self.students
    }
}
