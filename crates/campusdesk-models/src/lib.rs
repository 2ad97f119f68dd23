//! # CampusDesk Models
//!
//! Database entities, request DTOs and response shapes for the CampusDesk API.
//!
//! Joined views (e.g. a complaint with its student's name) are flat `FromRow`
//! structs produced by a single query; nested response shapes are assembled in
//! the services from several such rows.
//!
//! # Modules
//!
//! - [`users`]: the four account tables, login and account creation
//! - [`domains`]: authority domains
//! - [`problems`]: complaints routed to domains
//! - [`classes`]: classes and their lectures, notes, papers, discussions, attendance and grades
//! - [`admin`]: bulk import and the work report
//! - [`events`], [`clubs`], [`forum`], [`lost_found`], [`marketplace`]
//! - [`announcements`], [`emergency`], [`locations`]

pub mod admin;
pub mod announcements;
pub mod classes;
pub mod clubs;
pub mod domains;
pub mod emergency;
pub mod events;
pub mod forum;
pub mod locations;
pub mod lost_found;
pub mod marketplace;
pub mod problems;
pub mod users;

pub use campusdesk_auth::Role;
