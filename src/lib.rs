//! Contact management API library.

pub mod config;
pub mod contacts;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ApiConfig;
pub use contacts::{Contact, ContactDraft, ContactId, ContactStore};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
