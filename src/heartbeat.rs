//! Heartbeat recorder
//!
//! Every task stamps `{last_run, ok, ...summary}` for itself under the
//! master dashboard's `health_heartbeat` section, so the dashboard can show
//! per-check freshness. Entries are overwritten on each run; sibling tasks'
//! entries are never disturbed.

use serde_json::{Map, Value};

use crate::store::{DocumentId, DocumentStore, StoreError};

pub const HEARTBEAT_SECTION: &str = "health_heartbeat";

/// Current local time, second precision, ISO-8601.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Merge `{task: {last_run, ok, ...summary}}` into the dashboard heartbeat.
pub fn record(
    store: &dyn DocumentStore,
    task: &str,
    ok: bool,
    summary: Map<String, Value>,
) -> Result<(), StoreError> {
    let mut entry = Map::new();
    entry.insert("last_run".to_string(), Value::String(timestamp()));
    entry.insert("ok".to_string(), Value::Bool(ok));
    entry.extend(summary);
    store.merge_entry(
        DocumentId::Dashboard,
        HEARTBEAT_SECTION,
        task,
        Value::Object(entry),
    )
}
