//! Shared utilities.
//!
//! - [`cloudinary`]: hosted image storage backend
//! - [`email`]: outbound SMTP mail
//! - [`multipart`]: multipart form collection and image upload
//! - [`spreadsheet`]: student import sheet parsing

pub mod cloudinary;
pub mod email;
pub mod multipart;
pub mod spreadsheet;
