//! Router builder utilities for resource routes

use crate::server::handlers::{
    AppState, create_record, delete_record, get_record, list_records, update_record,
};
use axum::{Router, routing::get};

/// Build resource routes
///
/// These routes are generic and work for every registered resource:
/// - GET /api/{resource} - Filtered, sorted, paginated list
/// - POST /api/{resource} - Create a record
/// - GET /api/{resource}/{id} - Get a record
/// - PUT /api/{resource}/{id} - Update a record
/// - DELETE /api/{resource}/{id} - Delete a record and its dependents
pub fn build_resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/{resource}", get(list_records).post(create_record))
        .route(
            "/api/{resource}/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(state)
}
