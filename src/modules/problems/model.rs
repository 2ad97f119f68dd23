pub use campusdesk_models::problems::*;
