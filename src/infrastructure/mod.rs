//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain layer.
//!
//! - [`cache`] - Cache implementations (Redis, in-memory, no-op)
//! - [`persistence`] - Durable store implementations (PostgreSQL, in-memory)

pub mod cache;
pub mod persistence;
