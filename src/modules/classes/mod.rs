//! Classes and their academic records. Routes live in the admin, faculty and
//! student modules; this module holds the shared queries.

pub mod model;
pub mod service;

pub use model::*;
pub use service::ClassService;
