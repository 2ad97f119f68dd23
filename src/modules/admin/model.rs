//! Admin models, re-exported from the `campusdesk-models` crate.

pub use campusdesk_models::admin::*;
pub use campusdesk_models::users::{
    Authority, CreateAuthorityDto, CreateFacultyDto, CreateStudentDto, Faculty, Student,
};
