pub use campusdesk_models::events::*;
