//! Resource registry: the fixed map from route names to resource types

use crate::config::CatalogConfig;
use crate::core::error::ResourceError;
use crate::core::policy::AllowListPolicy;
use crate::core::validation::QueryRules;
use crate::resources::Resource;
use indexmap::IndexMap;
use std::sync::Arc;

/// A resource with its policy and list rules, built once at startup
#[derive(Clone)]
pub struct RegisteredResource {
    pub resource: Arc<dyn Resource>,
    pub policy: Arc<AllowListPolicy>,
    pub rules: Arc<QueryRules>,
}

/// Registry for all resources served by the application
///
/// Keyed by plural name, which is also the route segment. Read-only once
/// the server is built.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    resources: IndexMap<String, RegisteredResource>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, applying its config overrides
    pub fn register(&mut self, resource: Arc<dyn Resource>, config: &CatalogConfig) {
        let plural = resource.plural().to_string();

        let mut policy = resource.policy();
        if let Some(search) = config.search_override(&plural) {
            policy = policy.with_search_override(search);
            tracing::info!(resource = %plural, search = ?policy.allowed_search(), "search fields overridden");
        }
        let rules = resource.query_rules(config.pagination.max_size);

        self.resources.insert(
            plural,
            RegisteredResource {
                resource,
                policy: Arc::new(policy),
                rules: Arc::new(rules),
            },
        );
    }

    /// Look up a resource by its route name
    pub fn get(&self, plural: &str) -> Result<&RegisteredResource, ResourceError> {
        self.resources
            .get(plural)
            .ok_or_else(|| ResourceError::UnknownType {
                resource: plural.to_string(),
            })
    }

    /// Get all registered resource names
    pub fn resource_types(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }
}
