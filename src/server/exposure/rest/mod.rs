//! REST API exposure
//!
//! Consumes the shared [`AppState`] and produces an Axum `Router` with the
//! health routes, the resource routes and any custom routes.

use crate::server::handlers::AppState;
use crate::server::router::build_resource_routes;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

pub struct RestExposure;

impl RestExposure {
    /// Build the REST router
    ///
    /// # Arguments
    ///
    /// * `state` - Store, list engine and resource registry
    /// * `custom_routes` - Additional custom routes to merge
    pub fn build_router(state: AppState, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes().merge(build_resource_routes(state));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "catalog"
        }))
    }
}
