//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers)
//!     → request.rs (request ID, typed body decoding)
//!     → dispatch.rs (method → validator → store)
//!     → response.rs (envelope, error → status mapping)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, Envelope};
pub use server::{AppState, HttpServer, StartupError, CONTACTS_PATH, LEGACY_CONTACTS_PATH};
