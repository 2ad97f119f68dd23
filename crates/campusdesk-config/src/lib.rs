//! # CampusDesk Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and lifetime
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP settings for outbound mail
//! - [`storage`]: image upload backend (hosted image service or local disk)
//! - [`server`]: listener ports and the bootstrap admin account
//!
//! # Example
//!
//! ```ignore
//! use campusdesk_config::{JwtConfig, CorsConfig, EmailConfig, StorageConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod cors;
pub mod email;
pub mod jwt;
pub mod server;
pub mod storage;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use storage::{CloudinaryCredentials, StorageConfig};
