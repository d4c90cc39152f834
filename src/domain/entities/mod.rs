//! Core domain entities.
//!
//! - [`UrlRecord`] - A stored short code mapping
//! - [`NewUrlRecord`] - Insert payload for the durable store

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
