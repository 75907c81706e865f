//! Server module for building the catalog HTTP server
//!
//! The `ServerBuilder` registers the resource types, builds the shared list
//! engine and exposes everything as a REST router.

pub mod builder;
pub mod exposure;
pub mod handlers;
pub mod registry;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use registry::{RegisteredResource, ResourceRegistry};
