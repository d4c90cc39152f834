//! Domain layer containing business entities and background processing.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`cleanup_worker`] - Periodic purge of expired records
//!
//! The domain layer has no dependencies on the HTTP layer. Business logic is
//! encapsulated in [`crate::application::services`].

pub mod cleanup_worker;
pub mod entities;
pub mod repositories;
