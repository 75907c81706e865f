//! The category resource

use super::{Dependent, Resource};
use crate::core::error::ValidationError;
use crate::core::policy::{AllowListPolicy, FilterSpec, RelationSpec};
use crate::core::record::Record;
use crate::core::validation::payload::{is_integer, is_string, parse, to_field, to_number};
use crate::core::validation::{QueryRules, date, integer_between, text_length};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Columns of a category, in output order
pub const FIELDS: [&str; 5] = ["id", "name", "parent_id", "created_at", "updated_at"];

/// Body of `POST /api/categories` and `PUT /api/categories/{id}`
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(required, custom(function = "is_string"))]
    pub name: Option<Value>,

    #[validate(custom(function = "is_integer"))]
    pub parent_id: Option<Value>,
}

impl CategoryPayload {
    pub const ORDER: &'static [&'static str] = &["name", "parent_id"];

    pub fn into_record(self) -> Record {
        Record::new()
            .with("name", to_field(self.name))
            .with("parent_id", to_number(self.parent_id))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryResource;

impl Resource for CategoryResource {
    fn singular(&self) -> &str {
        "category"
    }

    fn plural(&self) -> &str {
        "categories"
    }

    fn policy(&self) -> AllowListPolicy {
        AllowListPolicy::new("categories")
            .fields(FIELDS)
            .filters(FIELDS.iter().map(|f| FilterSpec::exact(*f)))
            .sorts(FIELDS)
            .include("products", RelationSpec::has_many("products", "category_id"))
            .include("parent", RelationSpec::belongs_to("categories", "parent_id"))
            .include("children", RelationSpec::has_many("categories", "parent_id"))
    }

    fn query_rules(&self, max_page_size: u64) -> QueryRules {
        QueryRules::new()
            .filters(&["id", "parent_id"], integer_between(0, i128::from(u64::MAX)))
            .filters(&["created_at", "updated_at"], date())
            .filters(&["name"], text_length(2, 255))
            .with_common(max_page_size)
    }

    fn parse_payload(&self, body: Value) -> Result<Record, ValidationError> {
        parse::<CategoryPayload>(body, CategoryPayload::ORDER).map(CategoryPayload::into_record)
    }

    fn dependents(&self) -> Vec<Dependent> {
        vec![Dependent {
            resource: "products",
            foreign_key: "category_id",
        }]
    }
}
