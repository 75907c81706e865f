//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::list::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Address the HTTP server binds to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port`, ready for a listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Page-size bounds of every list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when the request has none
    pub default_size: u64,

    /// Largest page size a request may ask for
    pub max_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// Per-resource overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Replaces the searchable fields; undeclared fields are ignored
    #[serde(default)]
    pub search: Option<Vec<String>>,
}

/// Complete configuration of the catalog service
///
/// Every section is optional in YAML:
///
/// ```yaml
/// server:
///   host: 0.0.0.0
///   port: 8080
/// pagination:
///   default_size: 15
///   max_size: 100
/// resources:
///   categories:
///     search: [id, name]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Overrides keyed by plural resource name
    #[serde(default)]
    pub resources: IndexMap<String, ResourceConfig>,
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject page sizes that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if pagination.max_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_size".to_string(),
                value: pagination.max_size.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if pagination.default_size == 0 || pagination.default_size > pagination.max_size {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_size".to_string(),
                value: pagination.default_size.to_string(),
                message: format!("must be between 1 and {}", pagination.max_size),
            });
        }
        Ok(())
    }

    /// Search override for a resource, if configured
    pub fn search_override(&self, resource: &str) -> Option<&[String]> {
        self.resources
            .get(resource)
            .and_then(|r| r.search.as_deref())
    }
}
