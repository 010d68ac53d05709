//! Page count check
//!
//! Counts pages for every PDF in the drafts directory. Other file types are
//! reported as unsupported and a PDF the reader cannot open is reported as
//! unreadable with a null page count. The check itself passes unless the
//! drafts directory is missing.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Map};

use super::{TaskContext, TaskError, TaskReport};
use crate::heartbeat;
use crate::store::DocumentId;

pub const SECTION: &str = "page_counts";

pub const STATUS_OK: &str = "ok";
pub const STATUS_UNSUPPORTED: &str = "unsupported";
pub const STATUS_UNREADABLE: &str = "unreadable";

#[derive(Debug, Clone, Serialize)]
pub struct PageCount {
    pub file: String,
    pub pages: Option<u32>,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PageCountReport {
    pub page_counts: Vec<PageCount>,
    pub checked_at: String,
    pub ok: bool,
}

fn pdf_page_count(path: &Path) -> Option<u32> {
    match lopdf::Document::load(path) {
        Ok(doc) => Some(doc.get_pages().len() as u32),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "unreadable PDF");
            None
        }
    }
}

pub fn run(ctx: &TaskContext) -> Result<TaskReport, TaskError> {
    let drafts_dir = ctx.config.drafts_dir();
    if !drafts_dir.is_dir() {
        let body = json!({
            "error": format!("Missing drafts dir: {}", drafts_dir.display()),
            "ok": false,
        });
        ctx.store
            .merge_section(DocumentId::Dashboard, SECTION, body.clone())?;
        heartbeat::record(ctx.store.as_ref(), SECTION, false, Map::new())?;
        return Ok(TaskReport { ok: false, body });
    }

    let report = scan(&drafts_dir)?;
    let body = serde_json::to_value(&report)?;
    ctx.store
        .merge_section(DocumentId::Dashboard, SECTION, body.clone())?;
    let mut summary = Map::new();
    summary.insert("files".to_string(), json!(report.page_counts.len()));
    heartbeat::record(ctx.store.as_ref(), SECTION, true, summary)?;

    Ok(TaskReport { ok: true, body })
}

fn scan(drafts_dir: &Path) -> Result<PageCountReport, TaskError> {
    let entries = fs::read_dir(drafts_dir).map_err(|source| TaskError::Io {
        path: drafts_dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TaskError::Io {
            path: drafts_dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();

    let mut page_counts = Vec::new();
    for path in files {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_pdf = file.to_lowercase().ends_with(".pdf");
        let (pages, status) = if is_pdf {
            match pdf_page_count(&path) {
                Some(count) => (Some(count), STATUS_OK),
                None => (None, STATUS_UNREADABLE),
            }
        } else {
            (None, STATUS_UNSUPPORTED)
        };
        page_counts.push(PageCount {
            file,
            pages,
            status,
        });
    }

    Ok(PageCountReport {
        page_counts,
        checked_at: heartbeat::timestamp(),
        ok: true,
    })
}
