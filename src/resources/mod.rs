//! Resource types served by the catalog
//!
//! A [`Resource`] bundles everything the HTTP layer needs to serve one
//! resource type: its names, its list policy, the rules its list queries
//! must pass and how a write payload becomes a record.

pub mod category;
pub mod product;

pub use category::CategoryResource;
pub use product::ProductResource;

pub use crate::core::store::Dependent;

use crate::core::error::ValidationError;
use crate::core::policy::AllowListPolicy;
use crate::core::record::Record;
use crate::core::validation::QueryRules;
use serde_json::Value;

/// Trait that describes one resource type
pub trait Resource: Send + Sync {
    /// Singular name used in messages (e.g. "product")
    fn singular(&self) -> &str;

    /// Plural name used in routes and as the store table (e.g. "products")
    fn plural(&self) -> &str;

    /// Allow-lists of the list endpoint
    fn policy(&self) -> AllowListPolicy;

    /// Validation rules of the list endpoint
    fn query_rules(&self, max_page_size: u64) -> QueryRules;

    /// Validate a create/update body and turn it into attributes
    fn parse_payload(&self, body: Value) -> Result<Record, ValidationError>;

    /// Records deleted before a record of this type is deleted
    fn dependents(&self) -> Vec<Dependent> {
        Vec::new()
    }
}
