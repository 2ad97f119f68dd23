//! Sign-in models, re-exported from the `campusdesk-models` crate.

pub use campusdesk_models::users::{
    AccountCredentials, AccountSummary, Admin, LoginRequest, LoginResponse, RegisterAdminDto,
};
