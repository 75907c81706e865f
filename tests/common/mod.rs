//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use axum_test::TestServer;
use catalog::config::CatalogConfig;
use catalog::core::{Record, RecordStore};
use catalog::server::ServerBuilder;
use catalog::storage::InMemoryRecordStore;

/// Test server plus a handle on its store for seeding and inspection
pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryRecordStore,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(CatalogConfig::default())
}

pub fn create_test_app_with(config: CatalogConfig) -> TestApp {
    let store = InMemoryRecordStore::new();

    let app = ServerBuilder::new()
        .with_store(store.clone())
        .with_config(config)
        .with_default_resources()
        .build()
        .expect("Failed to build app");

    let server = TestServer::new(app);

    TestApp { server, store }
}

impl TestApp {
    /// Insert a category and return its id
    pub async fn category(&self, name: &str, parent_id: Option<i64>) -> i64 {
        let record = self
            .store
            .insert(
                "categories",
                Record::new().with("name", name).with("parent_id", parent_id),
            )
            .await
            .expect("insert category");
        record.key("id").expect("category id")
    }

    /// Insert a product and return its id
    pub async fn product(&self, name: &str, description: &str, stock: i64, category_id: i64) -> i64 {
        let record = self
            .store
            .insert(
                "products",
                Record::new()
                    .with("name", name)
                    .with("description", description)
                    .with("stock", stock)
                    .with("category_id", category_id),
            )
            .await
            .expect("insert product");
        record.key("id").expect("product id")
    }

    /// Seed `count` top-level categories named "Category 1".."Category N"
    pub async fn categories(&self, count: usize) -> Vec<i64> {
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            ids.push(self.category(&format!("Category {i}"), None).await);
        }
        ids
    }
}
