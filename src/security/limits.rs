//! Request size limits.
//!
//! Bodies over `security.max_body_size` fail body extraction with 413, which
//! the dispatcher turns into an error envelope.

use axum::extract::DefaultBodyLimit;

use crate::config::SecurityConfig;

pub fn body_limit_layer(config: &SecurityConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.max_body_size)
}
