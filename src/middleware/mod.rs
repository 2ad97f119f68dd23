//! Authentication and role gates.
//!
//! - [`auth`]: the `AuthUser` bearer-token extractor
//! - [`role`]: role layers (`require_admin`, ...) and extractors (`RequireAdmin`, ...)
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. A role layer (or `AuthUser` directly) verifies the token
//! 3. The role in the claims is compared against the route's allowed roles
//! 4. Handler executes if all checks pass
//!
//! | Failure | Status | Message |
//! |---------|--------|---------|
//! | no header | 401 | Unauthorized request |
//! | not `Bearer <token>` | 401 | Invalid authorization header format |
//! | bad signature or expired | 401 | Invalid Access Token |
//! | wrong role | 403 | Forbidden: Insufficient privileges |

pub mod auth;
pub mod role;
