//! Task dispatcher HTTP service
//!
//! Maps task identifiers to in-process task invocations and serves the
//! generated status pages. Intended for local same-machine use by a locally
//! opened page, so cross-origin headers are permissive.

pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::tasks::TaskContext;

/// Shared dispatcher state: the task context plus the run lock that
/// serializes task execution across concurrent requests.
pub struct ServerState {
    pub ctx: TaskContext,
    pub run_lock: Mutex<()>,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(ctx: TaskContext) -> SharedState {
        Arc::new(Self {
            ctx,
            run_lock: Mutex::new(()),
        })
    }
}

/// Create the dispatcher router. `site_dir` holds the generated pages served
/// as static files for any path that is not an API endpoint.
pub fn create_router(state: SharedState, site_dir: PathBuf) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/run", get(routes::run_task))
        .fallback_service(ServeDir::new(site_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
