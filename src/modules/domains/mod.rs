//! Authority domains. Exposed through the admin and authority routers.

pub mod model;
pub mod service;

pub use model::*;
pub use service::DomainService;
