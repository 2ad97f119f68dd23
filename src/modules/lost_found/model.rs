pub use campusdesk_models::lost_found::*;
