//! Verification tasks
//!
//! All four checks follow the same shape: gather inputs, evaluate, merge the
//! report into the status documents, emit the report JSON plus a pass/fail
//! exit status. Errors are data: a task that fails mid-evaluate still
//! produces a structured failure report instead of taking the process down.

pub mod evidence;
pub mod filenames;
pub mod pages;
pub mod worksplit;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::store::{DocumentStore, StoreError};

/// The fixed set of dispatchable tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    ValidateFilenames,
    CheckPageCounts,
    ComputeWorkSplit,
    CheckFedrampEvidence,
    RegenDashboards,
}

impl TaskId {
    pub const ALL: [TaskId; 5] = [
        TaskId::ValidateFilenames,
        TaskId::CheckPageCounts,
        TaskId::ComputeWorkSplit,
        TaskId::CheckFedrampEvidence,
        TaskId::RegenDashboards,
    ];

    /// Wire identifier used by the dispatcher and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            TaskId::ValidateFilenames => "validate_filenames",
            TaskId::CheckPageCounts => "check_page_counts",
            TaskId::ComputeWorkSplit => "compute_work_split",
            TaskId::CheckFedrampEvidence => "check_fedramp_evidence",
            TaskId::RegenDashboards => "regen_dashboards",
        }
    }

    /// Look up a task by wire identifier. Unknown names are rejected
    /// explicitly rather than panicking.
    pub fn parse(name: &str) -> Option<TaskId> {
        Self::ALL.into_iter().find(|task| task.name() == name)
    }
}

/// Everything a task needs: configuration plus the injected document store.
#[derive(Clone)]
pub struct TaskContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid filename pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A task's machine-readable report plus its pass/fail verdict.
pub struct TaskReport {
    pub ok: bool,
    pub body: Value,
}

/// Result of one task invocation, as returned by the dispatcher.
///
/// `stdout` carries the rendered report JSON and `returncode` the synthesized
/// process exit status (0 pass, 1 fail), matching the standalone CLI run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub ok: bool,
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
    pub task: &'static str,
}

/// Run one task to completion. Any error escaping the task body is caught
/// here and converted into a failure report; the caller never sees a panic
/// path or a propagated error.
pub fn run(id: TaskId, ctx: &TaskContext) -> TaskOutcome {
    let result = match id {
        TaskId::ValidateFilenames => filenames::run(ctx),
        TaskId::CheckPageCounts => pages::run(ctx),
        TaskId::ComputeWorkSplit => worksplit::run(ctx),
        TaskId::CheckFedrampEvidence => evidence::run(ctx),
        TaskId::RegenDashboards => crate::dashboard::regenerate(ctx),
    };
    match result {
        Ok(report) => TaskOutcome {
            ok: report.ok,
            returncode: i32::from(!report.ok),
            stdout: render(&report.body),
            stderr: String::new(),
            task: id.name(),
        },
        Err(err) => {
            tracing::error!(task = id.name(), error = %err, "task failed");
            let body = serde_json::json!({ "ok": false, "error": err.to_string() });
            TaskOutcome {
                ok: false,
                returncode: 1,
                stdout: render(&body),
                stderr: err.to_string(),
                task: id.name(),
            }
        }
    }
}

fn render(body: &Value) -> String {
    let mut text = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    text.push('\n');
    text
}
