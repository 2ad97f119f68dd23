pub use campusdesk_models::classes::*;
