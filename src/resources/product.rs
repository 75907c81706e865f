//! The product resource

use super::Resource;
use crate::core::error::ValidationError;
use crate::core::policy::{AllowListPolicy, FilterSpec, RelationSpec};
use crate::core::record::Record;
use crate::core::validation::payload::{is_numeric, is_string, parse, to_field, to_number};
use crate::core::validation::{QueryRules, date, integer_between, text_length};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Columns of a product, in output order
pub const FIELDS: [&str; 7] = [
    "id",
    "name",
    "description",
    "stock",
    "category_id",
    "created_at",
    "updated_at",
];

/// Body of `POST /api/products` and `PUT /api/products/{id}`
#[derive(Debug, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(required, custom(function = "is_string"))]
    pub name: Option<Value>,

    pub description: Option<Value>,

    #[validate(required, custom(function = "is_numeric"))]
    pub stock: Option<Value>,

    #[validate(required)]
    pub category_id: Option<Value>,
}

impl ProductPayload {
    pub const ORDER: &'static [&'static str] = &["name", "description", "stock", "category_id"];

    pub fn into_record(self) -> Record {
        Record::new()
            .with("name", to_field(self.name))
            .with("description", to_field(self.description))
            .with("stock", to_number(self.stock))
            .with("category_id", to_number(self.category_id))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductResource;

impl Resource for ProductResource {
    fn singular(&self) -> &str {
        "product"
    }

    fn plural(&self) -> &str {
        "products"
    }

    fn policy(&self) -> AllowListPolicy {
        AllowListPolicy::new("products")
            .fields(FIELDS)
            .filters(FIELDS.iter().map(|f| FilterSpec::exact(*f)))
            .sorts(FIELDS)
            .search(["id", "name", "description"])
            .include("category", RelationSpec::belongs_to("categories", "category_id"))
    }

    fn query_rules(&self, max_page_size: u64) -> QueryRules {
        QueryRules::new()
            .filters(
                &["id", "stock", "category_id"],
                integer_between(0, i128::from(u64::MAX)),
            )
            .filters(&["created_at", "updated_at"], date())
            .filters(&["name", "description"], text_length(2, 255))
            .with_common(max_page_size)
    }

    fn parse_payload(&self, body: Value) -> Result<Record, ValidationError> {
        parse::<ProductPayload>(body, ProductPayload::ORDER).map(ProductPayload::into_record)
    }
}
