//! # CampusDesk Auth
//!
//! - [`role`]: the four account kinds and their case-insensitive parsing
//! - [`claims`]: the JWT payload
//! - [`jwt`]: token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use campusdesk_auth::{Role, create_access_token, verify_token};
//! use campusdesk_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "Ada", "ada@campus.edu", Role::Student, None, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role()?, Role::Student);
//! ```

pub mod claims;
pub mod jwt;
pub mod role;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use role::Role;
