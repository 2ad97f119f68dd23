pub use campusdesk_models::clubs::*;
