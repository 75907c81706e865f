//! Typed error handling for the catalog
//!
//! Store and configuration internals work with `anyhow::Result`; at the
//! boundary of the list engine and the HTTP handlers those failures are
//! turned into a [`CatalogError`] so callers can match on the category.
//!
//! # Error Categories
//!
//! - [`ResourceError`]: unknown resource types and missing records
//! - [`ValidationError`]: rejected query strings and write payloads
//! - [`StorageError`]: failures of the persistence engine
//! - [`ConfigError`]: configuration parsing and loading
//!
//! # Example
//!
//! ```rust,ignore
//! match catalog.show("products", 42).await {
//!     Ok(record) => println!("{:?}", record),
//!     Err(CatalogError::Resource(ResourceError::NotFound { id, .. })) => {
//!         println!("product {} not found", id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Message of every 422 response
pub const INVALID_DATA_MESSAGE: &str = "The given data was invalid.";

/// The main error type of the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field errors, present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<IndexMap<String, Vec<String>>>,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Resource(e) => e.status_code(),
            CatalogError::Validation(e) => e.status_code(),
            CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::Resource(e) => e.error_code(),
            CatalogError::Validation(e) => e.error_code(),
            CatalogError::Storage(_) => "STORAGE_ERROR",
            CatalogError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            CatalogError::Validation(ValidationError::Fields(errors)) => ErrorResponse {
                code: self.error_code().to_string(),
                message: INVALID_DATA_MESSAGE.to_string(),
                errors: Some(errors.clone()),
                details: None,
            },
            CatalogError::Resource(ResourceError::NotFound { resource, id }) => ErrorResponse {
                code: self.error_code().to_string(),
                message: self.to_string(),
                errors: None,
                details: Some(serde_json::json!({ "resource": resource, "id": id })),
            },
            _ => ErrorResponse {
                code: self.error_code().to_string(),
                message: self.to_string(),
                errors: None,
                details: None,
            },
        }
    }

    /// Wrap a store failure
    pub fn storage(backend: &str, err: anyhow::Error) -> Self {
        CatalogError::Storage(StorageError::QueryError {
            backend: backend.to_string(),
            message: format!("{err:#}"),
        })
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Resource Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    #[error("Unknown resource type: {resource}")]
    UnknownType { resource: String },
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResourceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ResourceError::UnknownType { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ResourceError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ResourceError::UnknownType { .. } => "UNKNOWN_RESOURCE_TYPE",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ValidationError {
    /// Per-field messages, keyed like `filter.parent_id` or `name`
    #[error("Validation errors: {}", format_fields(.0))]
    Fields(IndexMap<String, Vec<String>>),

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

fn format_fields(errors: &IndexMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::Fields(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::Fields(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{f}'"))
        .unwrap_or_default()
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
