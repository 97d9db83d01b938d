//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() or signal received → listeners wake → server drains → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT (Ctrl-C) → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One shutdown source of truth shared by the server and its tests
//! - Late subscribers still observe a shutdown that already happened

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
