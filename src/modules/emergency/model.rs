pub use campusdesk_models::emergency::*;
