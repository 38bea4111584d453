//! Request and Response models for the host service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_key, SetRequest};
pub use responses::{ErrorBody, HealthBody, StatsBody, ValueBody, WriteAck, WriteOp};
