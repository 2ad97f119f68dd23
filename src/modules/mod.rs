//! Feature modules. Each routed module has `controller`, `model`, `router`
//! and `service` submodules; `classes` and `domains` hold shared queries only.

pub mod admin;
pub mod announcements;
pub mod auth;
pub mod authority;
pub mod classes;
pub mod clubs;
pub mod domains;
pub mod emergency;
pub mod events;
pub mod faculty;
pub mod forum;
pub mod locations;
pub mod lost_found;
pub mod marketplace;
pub mod problems;
pub mod student;
