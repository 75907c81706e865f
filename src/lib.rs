//! # Catalog API
//!
//! A product and category catalog backend whose core is an allow-listed
//! filtered-list query layer.
//!
//! ## Features
//!
//! - **Allow-list policies**: per resource, which fields may be selected,
//!   filtered, sorted, included and searched; everything else is dropped
//! - **Filtered lists**: `filter[k]=v`, `sort=-a,b`, `fields[type]=a,b`,
//!   `include=rel`, `search=text`, `page[number]` and `page[size]`
//! - **Pagination metadata**: `links` and `meta` blocks on every list
//! - **Pluggable storage**: in-memory by default, PostgreSQL behind the
//!   `postgres` feature
//! - **Configuration-Based**: server address, page sizes and search fields
//!   from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! let store = Arc::new(InMemoryRecordStore::new());
//! let engine = FilteredListQuery::new(store);
//!
//! let raw = RawQuery::new("/api/products")
//!     .with_filter("category_id", "1")
//!     .with_search("nike")
//!     .with_sort("-stock");
//! let page = engine.execute(&raw, &ProductResource.policy()).await?;
//! println!("{} of {} products", page.data.len(), page.meta.total);
//! ```

pub mod config;
pub mod core;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AllowListPolicy, CatalogError, CatalogResult, Direction, FetchRequest, FieldValue,
        FilterMode, FilterSpec, FilteredListQuery, Page, PageLinks, PageMeta, Predicate,
        QueryPlan, QueryRules, RawQuery, Record, RecordStore, Related, RelationKind,
        RelationSpec, SortKey,
    };

    // === Resources ===
    pub use crate::resources::{CategoryResource, ProductResource, Resource};

    // === Storage ===
    pub use crate::storage::InMemoryRecordStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresRecordStore;

    // === Config ===
    pub use crate::config::{CatalogConfig, PaginationConfig, ResourceConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{AppState, ResourceRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
