pub use campusdesk_models::locations::*;
