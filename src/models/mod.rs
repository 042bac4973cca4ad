//! Response models for the admin endpoints
//!
//! This module defines the DTOs (Data Transfer Objects) serialized into
//! the admin surface's JSON response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
