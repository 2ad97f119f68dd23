pub use campusdesk_models::users::{StudentProfile, UpdateStudentProfileDto};
