//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::handlers::AppState;
use super::registry::ResourceRegistry;
use crate::config::CatalogConfig;
use crate::core::list::FilteredListQuery;
use crate::core::store::RecordStore;
use crate::resources::{CategoryResource, ProductResource, Resource};
use crate::storage::InMemoryRecordStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for creating the catalog HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(CatalogConfig::from_yaml_file("config/catalog.yaml")?)
///     .with_default_resources()
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn RecordStore>>,
    config: CatalogConfig,
    resources: Vec<Arc<dyn Resource>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            config: CatalogConfig::default(),
            resources: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the record store; an in-memory store is used when none is set
    pub fn with_store(mut self, store: impl RecordStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a record store that is already shared
    pub fn with_shared_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the configuration
    pub fn with_config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register a resource type
    pub fn register_resource(mut self, resource: impl Resource + 'static) -> Self {
        self.resources.push(Arc::new(resource));
        self
    }

    /// Register the products and categories resources
    pub fn with_default_resources(self) -> Self {
        self.register_resource(ProductResource)
            .register_resource(CategoryResource)
    }

    /// Build the shared application state
    pub fn build_state(&mut self) -> Result<AppState> {
        self.config.validate()?;

        let store = self
            .store
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryRecordStore::new()) as Arc<dyn RecordStore>);

        let mut registry = ResourceRegistry::new();
        for resource in &self.resources {
            registry.register(resource.clone(), &self.config);
        }
        if registry.resource_types().is_empty() {
            tracing::warn!("no resources registered, only health routes will be served");
        }

        let pagination = &self.config.pagination;
        let engine = FilteredListQuery::new(store.clone())
            .with_page_sizes(pagination.default_size, pagination.max_size);

        Ok(AppState {
            store,
            engine,
            registry: Arc::new(registry),
        })
    }

    /// Build the final REST router
    ///
    /// This generates:
    /// - Health routes (`/health`, `/healthz`)
    /// - List and CRUD routes under `/api/{resource}`
    /// - Custom routes
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let app = RestExposure::build_router(state, custom_routes)?;

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `addr`, or to the configured `server.host:server.port`
    /// when `addr` is `None`. Handles SIGTERM and Ctrl+C.
    pub async fn serve(self, addr: Option<&str>) -> Result<()> {
        let addr = addr
            .map(str::to_string)
            .unwrap_or_else(|| self.config.server.addr());
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
