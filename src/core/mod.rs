//! Core module containing the list-query layer and its building blocks

pub mod error;
pub mod field;
pub mod list;
pub mod page;
pub mod plan;
pub mod policy;
pub mod query;
pub mod record;
pub mod store;
pub mod validation;

pub use error::{CatalogError, CatalogResult};
pub use field::FieldValue;
pub use list::FilteredListQuery;
pub use page::{Page, PageLinks, PageMeta};
pub use plan::{Direction, Predicate, QueryPlan, SortKey};
pub use policy::{AllowListPolicy, FilterMode, FilterSpec, RelationKind, RelationSpec};
pub use query::RawQuery;
pub use record::{Record, Related};
pub use store::{Dependent, FetchRequest, RecordStore};
pub use validation::QueryRules;
