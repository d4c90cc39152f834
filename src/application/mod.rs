//! Application layer services implementing business logic.
//!
//! Services orchestrate domain operations by coordinating the durable store,
//! the cache and the code generator, and expose a clean API to HTTP handlers
//! and the cleanup worker.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short URL creation, resolution and cleanup

pub mod services;
