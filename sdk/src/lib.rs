//! Crop Advisor SDK
//!
//! Shared library providing the error taxonomy, request/response types, and the
//! advisor handle. This crate is used by both the engine and the transports.

/// Error types and handling
pub mod errors;

/// Advisory request/response types
pub mod types;

/// Advisor handle used by transports
pub mod handle;

// Re-export commonly used types
pub use errors::{AdvisorError, AdvisorErrorExt};
pub use handle::{AdvisorHandle, AdvisorHandleImpl};
pub use types::{Advice, AdvisoryRequest, Climate};
