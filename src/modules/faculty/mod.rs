pub mod controller;
pub mod router;

pub use router::init_faculty_router;
