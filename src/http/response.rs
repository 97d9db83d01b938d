//! Response envelope and error mapping.
//!
//! # Responsibilities
//! - Wrap every result in `{status, data|message}`
//! - Map each error kind to an HTTP status code
//!
//! # Design Decisions
//! - The envelope is authoritative; the status code is informational
//! - `ApiError` is the only place errors become responses

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::contacts::{ContactId, StorageError, ValidationError};

/// Methods the contacts endpoint dispatches on.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

/// The `{status, data|message}` wrapper.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T: Serialize> {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<T>,
    },
    Error {
        message: String,
    },
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope::Success { data: Some(data) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            message: message.into(),
        }
    }
}

impl Envelope<()> {
    /// Success with no payload: `{"status":"success"}`.
    pub fn ok() -> Self {
        Envelope::Success { data: None }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        // `ApiError` picks precise codes; a bare error envelope is a server fault.
        let status = match &self {
            Envelope::Success { .. } => StatusCode::OK,
            Envelope::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Payload of a successful POST.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: ContactId,
}

/// API-level errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Kontak dengan id {0} tidak ditemukan")]
    NotFound(ContactId),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Body permintaan bukan JSON yang valid: {0}")]
    MalformedBody(String),

    #[error("Format body permintaan tidak sesuai: {0}")]
    InvalidBody(String),

    #[error("Parameter query tidak valid: {0}")]
    InvalidQuery(String),

    #[error("Body permintaan terlalu besar")]
    PayloadTooLarge,

    #[error("ID kontak wajib diisi")]
    MissingId,

    #[error("Metode {0} tidak didukung")]
    MethodNotAllowed(Method),

    #[error("Endpoint {0} tidak ditemukan")]
    UnknownPath(String),

    #[error("Permintaan melebihi batas waktu")]
    Timeout,

    #[error("Kesalahan internal server: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) | ApiError::UnknownPath(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedBody(_)
            | ApiError::InvalidBody(_)
            | ApiError::InvalidQuery(_)
            | ApiError::MissingId => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Short label for the `outcome` metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "invalid",
            ApiError::NotFound(_) => "not_found",
            ApiError::Storage(_) => "storage_error",
            ApiError::Timeout => "timeout",
            ApiError::Internal(_) => "internal",
            _ => "rejected",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let mut response = (status, Json(Envelope::<()>::error(self.to_string()))).into_response();
        if let ApiError::MethodNotAllowed(_) = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}

/// Replaces the bodyless 408 produced by the timeout layer with an envelope.
///
/// Handlers never answer 408 themselves, so any 408 seen here is a timeout.
pub async fn timeout_envelope(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}
