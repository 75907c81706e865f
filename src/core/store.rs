//! Persistence capability required by the catalog

use crate::core::plan::{Predicate, SortKey};
use crate::core::record::Record;
use anyhow::Result;
use async_trait::async_trait;

/// One data fetch: predicate, order, projection and window
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
    /// `None` fetches every attribute
    pub projection: Option<Vec<String>>,
    pub offset: u64,
    /// `None` fetches every matching record
    pub limit: Option<u64>,
}

impl FetchRequest {
    /// Every record matching `predicate`, in `sort` order
    pub fn matching(predicate: Predicate, sort: Vec<SortKey>) -> Self {
        Self {
            predicate,
            sort,
            projection: None,
            offset: 0,
            limit: None,
        }
    }
}

/// Rows of another table that go away with a deleted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependent {
    /// Resource name of the dependent records
    pub resource: &'static str,
    /// Field on the dependent records holding the deleted record's id
    pub foreign_key: &'static str,
}

/// Service trait over a relational-style store of resource tables
///
/// Tables are addressed by resource name ("products", "categories") and
/// every row has an integer primary key `id`. The catalog is agnostic to
/// the underlying storage mechanism.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the records matching a request
    async fn fetch(&self, resource: &str, request: &FetchRequest) -> Result<Vec<Record>>;

    /// Count the records matching a predicate
    async fn count(&self, resource: &str, predicate: &Predicate) -> Result<u64>;

    /// Get a record by primary key
    async fn get(&self, resource: &str, id: i64) -> Result<Option<Record>>;

    /// Insert a record, assigning its id and timestamps
    async fn insert(&self, resource: &str, attributes: Record) -> Result<Record>;

    /// Merge `changes` into an existing record and touch `updated_at`
    ///
    /// Returns `None` when no record has this id.
    async fn update(&self, resource: &str, id: i64, changes: Record) -> Result<Option<Record>>;

    /// Delete a record together with its dependents, returning the record
    ///
    /// The dependent rows and the record go in one unit: on failure nothing
    /// is removed. Returns `None`, removing nothing, when no record has
    /// this id.
    async fn delete(
        &self,
        resource: &str,
        id: i64,
        dependents: &[Dependent],
    ) -> Result<Option<Record>>;
}
