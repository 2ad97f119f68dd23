pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use service::EventService;
pub use router::init_event_router;
