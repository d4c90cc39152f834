//! Durable store implementations.
//!
//! - [`PgUrlRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryUrlRepository`] - In-memory fake with a controllable clock

pub mod memory_url_repository;
pub mod pg_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
