//! Filename convention check
//!
//! Scans the drafts directory and flags every file whose name matches none of
//! the configured naming patterns. The report lands in the master dashboard's
//! `filename_validation` section.

use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::{json, Map};

use super::{TaskContext, TaskError, TaskReport};
use crate::heartbeat;
use crate::store::DocumentId;

pub const SECTION: &str = "filename_validation";
pub const ISSUE_PATTERN_MISMATCH: &str = "filename_not_matching_patterns";

#[derive(Debug, Clone, Serialize)]
pub struct FileSeen {
    pub file: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilenameIssue {
    pub file: String,
    pub issue: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FilenameReport {
    pub checked_at: String,
    pub drafts_dir: String,
    pub files_seen: Vec<FileSeen>,
    pub issues: Vec<FilenameIssue>,
    pub ok: bool,
}

/// Compile the configured patterns, case-insensitive.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, TaskError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| TaskError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

/// True when the name matches at least one pattern rule.
pub fn is_allowed(name: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(name))
}

pub fn run(ctx: &TaskContext) -> Result<TaskReport, TaskError> {
    let drafts_dir = ctx.config.drafts_dir();
    if !drafts_dir.is_dir() {
        let body = json!({
            "error": format!("Missing drafts dir: {}", drafts_dir.display()),
            "issues": [],
            "ok": false,
        });
        ctx.store
            .merge_section(DocumentId::Dashboard, SECTION, body.clone())?;
        heartbeat::record(ctx.store.as_ref(), SECTION, false, Map::new())?;
        return Ok(TaskReport { ok: false, body });
    }

    let patterns = compile_patterns(&ctx.config.filenames.patterns)?;
    let report = scan(&drafts_dir, &patterns)?;
    let ok = report.ok;
    let body = serde_json::to_value(&report)?;

    ctx.store
        .merge_section(DocumentId::Dashboard, SECTION, body.clone())?;
    let mut summary = Map::new();
    summary.insert("files".to_string(), json!(report.files_seen.len()));
    summary.insert("issues".to_string(), json!(report.issues.len()));
    heartbeat::record(ctx.store.as_ref(), SECTION, ok, summary)?;

    Ok(TaskReport { ok, body })
}

fn scan(drafts_dir: &Path, patterns: &[Regex]) -> Result<FilenameReport, TaskError> {
    let mut names = Vec::new();
    let entries = fs::read_dir(drafts_dir).map_err(|source| TaskError::Io {
        path: drafts_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| TaskError::Io {
            path: drafts_dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            continue;
        }
        let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
        names.push((entry.file_name().to_string_lossy().into_owned(), size));
    }
    names.sort();

    let mut files_seen = Vec::new();
    let mut issues = Vec::new();
    for (file, size) in names {
        if !is_allowed(&file, patterns) {
            issues.push(FilenameIssue {
                file: file.clone(),
                issue: ISSUE_PATTERN_MISMATCH,
            });
        }
        files_seen.push(FileSeen { file, size });
    }

    Ok(FilenameReport {
        checked_at: heartbeat::timestamp(),
        drafts_dir: drafts_dir.display().to_string(),
        ok: issues.is_empty(),
        files_seen,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilenameConfig;

    #[test]
    fn test_default_patterns() {
        let patterns = compile_patterns(&FilenameConfig::default().patterns).unwrap();

        assert!(is_allowed("vol1_technical_intro.md", &patterns));
        assert!(is_allowed("VOL2_PASTPERF_summary.PDF", &patterns));
        assert!(is_allowed("RPRTech_Phase I-pricing.xlsx", &patterns));
        assert!(!is_allowed("draft-notes.txt", &patterns));
        assert!(!is_allowed("vol1_technical_intro.txt", &patterns));
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let patterns = vec!["(unclosed".to_string()];
        assert!(compile_patterns(&patterns).is_err());
    }
}
