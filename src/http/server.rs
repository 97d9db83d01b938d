//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Open the contact store and apply seed data
//! - Create the Axum Router with the contacts, health and fallback handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, headers)
//! - Answer timeouts with an error envelope like every other failure
//! - Serve on a listener until shutdown is signalled

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::contacts::{self, ContactStore, StorageError, ValidContact, ValidationError};
use crate::http::dispatch::{contacts_handler, health_handler, not_found_handler};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use crate::http::response::timeout_envelope;
use crate::lifecycle::ShutdownListener;
use crate::security::{headers, limits};

/// Path of the contacts endpoint.
pub const CONTACTS_PATH: &str = "/api/contacts";

/// Path of the original single-file endpoint, kept as an alias.
pub const LEGACY_CONTACTS_PATH: &str = "/api.php";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContactStore>,
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open contact store: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid seed contact: {0}")]
    Seed(#[from] ValidationError),
}

/// HTTP server for the contact API.
pub struct HttpServer {
    router: Router,
    store: Arc<ContactStore>,
}

impl HttpServer {
    /// Open the configured store, seed it, and build the router.
    pub fn new(config: ApiConfig) -> Result<Self, StartupError> {
        let store = match &config.storage.data_path {
            Some(path) => ContactStore::open(path)?,
            None => ContactStore::in_memory(),
        };

        let seed = config
            .storage
            .seed
            .iter()
            .map(contacts::validate)
            .collect::<Result<Vec<ValidContact>, _>>()?;
        let seeded = store.seed(seed)?;
        if seeded > 0 {
            tracing::info!(contacts = seeded, "Seeded empty contact store");
        }

        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Build a server around an existing store. Seed data is not applied.
    pub fn with_store(config: ApiConfig, store: Arc<ContactStore>) -> Self {
        let state = AppState {
            store: store.clone(),
        };
        let router = Self::build_router(&config, state);
        Self { router, store }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ApiConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(CONTACTS_PATH, any(contacts_handler))
            .route(LEGACY_CONTACTS_PATH, any(contacts_handler))
            .route("/health", get(health_handler))
            .fallback(not_found_handler)
            .with_state(state)
            .layer(limits::body_limit_layer(&config.security))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(timeout_envelope));

        if config.security.security_headers {
            router = router.layer(headers::nosniff_layer());
        }

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections until `shutdown` resolves.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            contacts = self.store.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn store(&self) -> Arc<ContactStore> {
        self.store.clone()
    }
}
