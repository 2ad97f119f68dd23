//! # CampusDesk Core
//!
//! Core types, errors, and utilities for the CampusDesk API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`response`]: The uniform `{status, message, data}` success envelope
//! - [`password`]: Password hashing and the derived default password for imported accounts
//! - [`file_storage`]: Storage backends for uploaded images
//! - [`serde`]: Custom serde helpers for form and query input
//!
//! # Example
//!
//! ```ignore
//! use campusdesk_core::{ApiResponse, AppError, hash_password};
//!
//! let hash = hash_password("secret")?;
//! return Ok(ApiResponse::created("Student created successfully", student));
//! ```

pub mod errors;
pub mod file_storage;
pub mod password;
pub mod response;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError, StoredFile};
pub use password::{default_password_for, hash_password, verify_password};
pub use response::{ApiResponse, ErrorResponse};
