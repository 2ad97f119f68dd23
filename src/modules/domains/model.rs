pub use campusdesk_models::domains::*;
