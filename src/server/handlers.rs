//! HTTP handlers for resource operations
//!
//! The handlers are resource-agnostic: the `{resource}` path segment picks
//! the registered resource, its policy and its validation rules.

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::{CatalogError, CatalogResult, ResourceError, ValidationError};
use crate::core::list::FilteredListQuery;
use crate::core::page::Page;
use crate::core::query::RawQuery;
use crate::core::record::Record;
use crate::core::store::RecordStore;
use crate::server::registry::ResourceRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub engine: FilteredListQuery,
    pub registry: Arc<ResourceRegistry>,
}

/// Response of the list endpoint: the page plus a status message
#[derive(Debug, Serialize)]
pub struct ListResponse {
    #[serde(flatten)]
    pub page: Page<Record>,
    pub message: String,
}

/// Response carrying a single record
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub data: Record,
    pub message: String,
}

impl RecordResponse {
    fn new(data: Record, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            data,
            message: message.into(),
        })
    }
}

const SUCCESS: &str = "success";

fn not_found(resource: &str, id: impl ToString) -> CatalogError {
    ResourceError::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
    .into()
}

/// Parse a path id; anything that is not an integer cannot exist
fn parse_id(resource: &str, id: &str) -> CatalogResult<i64> {
    id.parse::<i64>().map_err(|_| not_found(resource, id))
}

fn body(payload: Result<Json<Value>, JsonRejection>) -> CatalogResult<Value> {
    payload.map(|Json(value)| value).map_err(|e| {
        ValidationError::InvalidJson {
            message: e.body_text(),
        }
        .into()
    })
}

/// List records: GET /api/{resource}
pub async fn list_records(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    OriginalUri(uri): OriginalUri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> CatalogResult<Json<ListResponse>> {
    let entry = state.registry.get(&resource)?;
    let raw = RawQuery::from_pairs(uri.path(), pairs);

    entry.rules.check(&raw).map_err(ValidationError::Fields)?;

    let page = state.engine.execute(&raw, &entry.policy).await?;
    tracing::debug!(resource = %resource, total = page.meta.total, "listed records");

    Ok(Json(ListResponse {
        page,
        message: SUCCESS.to_string(),
    }))
}

/// Get one record: GET /api/{resource}/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> CatalogResult<Json<RecordResponse>> {
    state.registry.get(&resource)?;
    let id = parse_id(&resource, &id)?;

    let record = state
        .store
        .get(&resource, id)
        .await
        .map_err(|e| CatalogError::storage(&resource, e))?
        .ok_or_else(|| not_found(&resource, id))?;

    Ok(RecordResponse::new(record, SUCCESS))
}

/// Create a record: POST /api/{resource}
pub async fn create_record(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<RecordResponse>)> {
    let entry = state.registry.get(&resource)?;
    let attributes = entry.resource.parse_payload(body(payload)?)?;

    let record = state
        .store
        .insert(&resource, attributes)
        .await
        .map_err(|e| CatalogError::storage(&resource, e))?;

    tracing::info!(resource = %resource, id = ?record.key("id"), "record created");

    let message = format!("The new {} has been saved.", entry.resource.singular());
    Ok((StatusCode::CREATED, RecordResponse::new(record, message)))
}

/// Update a record: PUT /api/{resource}/{id}
pub async fn update_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> CatalogResult<Json<RecordResponse>> {
    let entry = state.registry.get(&resource)?;
    let id = parse_id(&resource, &id)?;

    // A missing record is reported before the body is looked at
    let exists = state
        .store
        .get(&resource, id)
        .await
        .map_err(|e| CatalogError::storage(&resource, e))?
        .is_some();
    if !exists {
        return Err(not_found(&resource, id));
    }

    let changes = entry.resource.parse_payload(body(payload)?)?;
    let record = state
        .store
        .update(&resource, id, changes)
        .await
        .map_err(|e| CatalogError::storage(&resource, e))?
        .ok_or_else(|| not_found(&resource, id))?;

    tracing::info!(resource = %resource, id, "record updated");

    let message = format!("The {} has been updated.", entry.resource.singular());
    Ok(RecordResponse::new(record, message))
}

/// Delete a record and its dependents: DELETE /api/{resource}/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> CatalogResult<Json<RecordResponse>> {
    let entry = state.registry.get(&resource)?;
    let id = parse_id(&resource, &id)?;

    let record = state
        .store
        .delete(&resource, id, &entry.resource.dependents())
        .await
        .map_err(|e| CatalogError::storage(&resource, e))?
        .ok_or_else(|| not_found(&resource, id))?;

    tracing::info!(resource = %resource, id, "record deleted");

    let message = format!("The {} has been deleted.", entry.resource.singular());
    Ok(RecordResponse::new(record, message))
}
