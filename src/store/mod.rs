//! Document store - shared JSON status documents
//!
//! Handles:
//! - The fixed set of named proposal status documents
//! - Section-level partial merges (each task owns its top-level keys)
//! - Deterministic serialization so no-op reruns are byte-identical
//!
//! Tasks never open document files directly; everything goes through the
//! [`DocumentStore`] trait so tests can substitute an in-memory store.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde_json::{Map, Value};

/// The fixed set of proposal status documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentId {
    /// Master dashboard: validation sections plus the health heartbeat
    Dashboard,
    /// Requirements: work-split calculation
    Requirements,
    /// Compliance verification: evidence chain and work-split verification
    Compliance,
    /// Volumes completion: work-split cross-reference
    Volumes,
    /// Subcontractor dependency records with evidence items
    MoviusDependencies,
}

impl DocumentId {
    pub const ALL: [DocumentId; 5] = [
        DocumentId::Dashboard,
        DocumentId::Requirements,
        DocumentId::Compliance,
        DocumentId::Volumes,
        DocumentId::MoviusDependencies,
    ];

    /// Backing file name for this document.
    pub fn file_name(self) -> &'static str {
        match self {
            DocumentId::Dashboard => "proposal_master_dashboard.json",
            DocumentId::Requirements => "requirements.json",
            DocumentId::Compliance => "compliance_verification.json",
            DocumentId::Volumes => "volumes_completion.json",
            DocumentId::MoviusDependencies => "movius_dependencies.json",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {doc}: {source}")]
    Serialize {
        doc: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Read/merge primitives over the status documents.
///
/// Implementations must serialize mutations so that concurrent callers
/// interleave safely at merge-section granularity.
pub trait DocumentStore: Send + Sync {
    /// Parsed document content. An absent, unreadable, or malformed backing
    /// resource reads as an empty object.
    fn read(&self, doc: DocumentId) -> Map<String, Value>;

    /// Replace one top-level section, leaving every other key untouched.
    /// Creates the backing resource if absent.
    fn merge_section(&self, doc: DocumentId, section: &str, value: Value) -> Result<(), StoreError>;

    /// Merge one entry inside a nested section (read-modify-write one level
    /// deeper than `merge_section`), preserving the section's other entries.
    fn merge_entry(
        &self,
        doc: DocumentId,
        section: &str,
        entry: &str,
        value: Value,
    ) -> Result<(), StoreError>;
}

/// Insert `value` under `section[entry]`, preserving sibling entries.
/// A non-object section value is replaced by a fresh object.
pub(crate) fn set_nested(content: &mut Map<String, Value>, section: &str, entry: &str, value: Value) {
    let slot = content
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Some(map) = slot.as_object_mut() {
        map.insert(entry.to_string(), value);
    }
}
