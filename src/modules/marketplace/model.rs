pub use campusdesk_models::marketplace::*;
