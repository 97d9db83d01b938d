//! Contacts endpoint dispatcher.
//!
//! One path, four methods:
//! - `GET ?search=` → store search, always succeeds
//! - `POST {nama, telepon, email}` → validate → insert
//! - `PUT {id, nama, telepon, email}` → validate → update
//! - `DELETE {id}` → delete
//!
//! Anything else is answered with 405. Store mutations write to disk, so they
//! run on the blocking pool.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, rejection::QueryRejection, OriginalUri, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::Instant;

use crate::contacts::{self, ContactDraft, ContactStore, StorageError};
use crate::http::request::{parse_body, DeleteContactRequest, SearchQuery, UpdateContactRequest};
use crate::http::response::{ApiError, Created, Envelope};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Handler mounted on the contacts path for every method.
pub async fn contacts_handler(
    State(state): State<AppState>,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();

    let response = match method {
        Method::GET => match query {
            Ok(Query(pairs)) => search(&state, SearchQuery::from_pairs(pairs)).into_response(),
            Err(rejection) => ApiError::InvalidQuery(rejection.body_text()).into_response(),
        },
        Method::POST => mutation("insert", create(&state, body).await),
        Method::PUT => mutation("update", update(&state, body).await),
        Method::DELETE => mutation("delete", delete(&state, body).await),
        ref other => ApiError::MethodNotAllowed(other.clone()).into_response(),
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

/// Health probe: `{status:"success", data:{status:"ok", contacts:N}}`.
pub async fn health_handler(State(state): State<AppState>) -> Envelope<Health> {
    Envelope::success(Health {
        status: "ok",
        contacts: state.store.len(),
    })
}

/// Fallback for unknown paths.
pub async fn not_found_handler(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::UnknownPath(uri.path().to_string())
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub contacts: usize,
}

fn search(state: &AppState, query: SearchQuery) -> Envelope<Vec<contacts::Contact>> {
    let term = query.search.as_deref();
    let found = state.store.search(term);
    tracing::debug!(search = ?term, results = found.len(), "Searched contacts");
    Envelope::success(found)
}

async fn create(state: &AppState, body: Result<Bytes, BytesRejection>) -> Result<Response, ApiError> {
    let draft: ContactDraft = parse_body(&body.map_err(body_error)?)?;
    let contact = contacts::validate(&draft)?;
    let id = on_store(state, move |store| store.insert(contact)).await?;

    tracing::info!(id, "Contact created");
    Ok(Envelope::success(Created { id }).into_response())
}

async fn update(state: &AppState, body: Result<Bytes, BytesRejection>) -> Result<Response, ApiError> {
    let request: UpdateContactRequest = parse_body(&body.map_err(body_error)?)?;
    let id = request.id.ok_or(ApiError::MissingId)?;
    let contact = contacts::validate(&request.contact)?;

    if !on_store(state, move |store| store.update(id, contact)).await? {
        return Err(ApiError::NotFound(id));
    }

    tracing::info!(id, "Contact updated");
    Ok(Envelope::<()>::ok().into_response())
}

async fn delete(state: &AppState, body: Result<Bytes, BytesRejection>) -> Result<Response, ApiError> {
    let request: DeleteContactRequest = parse_body(&body.map_err(body_error)?)?;
    let id = request.id.ok_or(ApiError::MissingId)?;

    if !on_store(state, move |store| store.delete(id)).await? {
        return Err(ApiError::NotFound(id));
    }

    tracing::info!(id, "Contact deleted");
    Ok(Envelope::<()>::ok().into_response())
}

/// Run a store mutation on the blocking pool.
async fn on_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&ContactStore) -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn mutation(operation: &'static str, result: Result<Response, ApiError>) -> Response {
    match result {
        Ok(response) => {
            metrics::record_mutation(operation, "ok");
            response
        }
        Err(e) => {
            metrics::record_mutation(operation, e.outcome());
            e.into_response()
        }
    }
}

fn body_error(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::MalformedBody(rejection.body_text())
    }
}
