//! Dispatcher HTTP routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::SharedState;
use crate::tasks::{self, TaskId};

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// GET /health - liveness, no side effects
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

#[derive(Deserialize)]
pub struct RunQuery {
    #[serde(default)]
    pub task: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub task: String,
}

/// GET /run?task=<id>
///
/// Executes the named task synchronously and returns its run record. Unknown
/// identifiers are a client error; the process keeps serving either way.
pub async fn run_task(State(state): State<SharedState>, Query(query): Query<RunQuery>) -> Response {
    let Some(id) = TaskId::parse(&query.task) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                ok: false,
                error: "unknown_task".to_string(),
                task: query.task,
            }),
        )
            .into_response();
    };

    // One task at a time: concurrent /run calls queue here so document
    // merges never interleave mid-update.
    let _running = state.run_lock.lock().await;
    info!(task = id.name(), "dispatching task");

    let ctx = state.ctx.clone();
    match tokio::task::spawn_blocking(move || tasks::run(id, &ctx)).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                ok: false,
                error: err.to_string(),
                task: id.name().to_string(),
            }),
        )
            .into_response(),
    }
}
