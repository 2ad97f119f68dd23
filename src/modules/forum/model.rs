pub use campusdesk_models::forum::*;
