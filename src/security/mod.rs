//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (cap body size, 413 on overflow)
//!     → handler
//! Outgoing response:
//!     → headers.rs (hardening headers)
//! ```

pub mod headers;
pub mod limits;
