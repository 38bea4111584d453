//! API Module
//!
//! HTTP surface of the example host service embedding a [`crate::cache::CachedStore`].
//!
//! # Endpoints
//! - `PUT /set` - Write a key-value pair through both tiers
//! - `GET /get/:key` - Read a value, local tier first
//! - `DELETE /del/:key` - Delete a key from both tiers
//! - `GET /stats` - Tier counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
