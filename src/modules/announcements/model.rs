pub use campusdesk_models::announcements::*;
