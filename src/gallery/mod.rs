//! The data layer: payload types, validation, loading and media URLs.

pub mod client;
pub mod error;
pub mod loader;
pub mod media;
pub mod types;
pub mod validate;
