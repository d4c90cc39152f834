//! REST API layer for HTTP request/response handling.
//!
//! This layer validates input, translates HTTP requests into service calls and
//! maps [`crate::error::AppError`] to HTTP responses.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request processing middleware
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
