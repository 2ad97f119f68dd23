//! Authority workspace: the domain complaint queue and domain management.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::init_authority_router;
