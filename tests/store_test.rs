//! Document store invariants: partial merges, malformed fallback, and
//! byte-stable serialization.

use proposal_node::store::{DocumentId, DocumentStore, FileStore};
use serde_json::json;

#[test]
fn test_absent_document_reads_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());

    assert!(store.read(DocumentId::Compliance).is_empty());
}

#[test]
fn test_merge_creates_file_with_trailing_newline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());

    store
        .merge_section(DocumentId::Dashboard, "page_counts", json!({"ok": true}))
        .expect("merge");

    let path = dir.path().join(DocumentId::Dashboard.file_name());
    let text = std::fs::read_to_string(path).expect("read back");
    assert!(text.ends_with('\n'));
    assert!(!text.ends_with("\n\n"));
    // Pretty-printed, not a single line
    assert!(text.lines().count() > 1);
}

#[test]
fn test_merge_section_preserves_siblings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());

    store
        .merge_section(DocumentId::Compliance, "work_split_verification", json!({"a": 1}))
        .expect("first merge");
    store
        .merge_section(
            DocumentId::Compliance,
            "fedramp_evidence_verification",
            json!({"verification_status": "pass"}),
        )
        .expect("second merge");

    let doc = store.read(DocumentId::Compliance);
    assert_eq!(doc["work_split_verification"], json!({"a": 1}));
    assert_eq!(
        doc["fedramp_evidence_verification"]["verification_status"],
        "pass"
    );
}

#[test]
fn test_merge_section_replaces_owned_section_wholesale() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());

    store
        .merge_section(DocumentId::Dashboard, "page_counts", json!({"stale": true}))
        .expect("merge");
    store
        .merge_section(DocumentId::Dashboard, "page_counts", json!({"ok": true}))
        .expect("merge");

    let doc = store.read(DocumentId::Dashboard);
    assert_eq!(doc["page_counts"], json!({"ok": true}));
}

#[test]
fn test_malformed_document_reads_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    let path = dir.path().join(DocumentId::Requirements.file_name());
    std::fs::write(&path, "{not json").expect("write junk");

    assert!(store.read(DocumentId::Requirements).is_empty());

    // A non-object top level also reads as empty
    std::fs::write(&path, "[1, 2, 3]\n").expect("write array");
    assert!(store.read(DocumentId::Requirements).is_empty());
}

#[test]
fn test_repeated_merge_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    let path = dir.path().join(DocumentId::Volumes.file_name());
    let section = json!({
        "rpr_tech_percentage": 60.0,
        "movius_percentage": 40.0,
        "verification_check": {"status": "pass"},
    });

    store
        .merge_section(DocumentId::Volumes, "work_split_cross_reference", section.clone())
        .expect("first write");
    let first = std::fs::read(&path).expect("read");

    store
        .merge_section(DocumentId::Volumes, "work_split_cross_reference", section)
        .expect("second write");
    let second = std::fs::read(&path).expect("read");

    assert_eq!(first, second);
}

#[test]
fn test_merge_entry_preserves_sibling_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());

    store
        .merge_entry(
            DocumentId::Dashboard,
            "health_heartbeat",
            "work_split",
            json!({"last_run": "t1", "ok": true}),
        )
        .expect("first entry");
    store
        .merge_entry(
            DocumentId::Dashboard,
            "health_heartbeat",
            "fedramp_evidence",
            json!({"last_run": "t2", "ok": false}),
        )
        .expect("second entry");

    let doc = store.read(DocumentId::Dashboard);
    let beats = doc["health_heartbeat"].as_object().expect("heartbeat map");
    assert_eq!(beats.len(), 2);
    assert_eq!(beats["work_split"]["ok"], true);
    assert_eq!(beats["fedramp_evidence"]["ok"], false);
}

#[test]
fn test_merge_entry_replaces_non_object_section() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());

    store
        .merge_section(DocumentId::Dashboard, "health_heartbeat", json!("corrupt"))
        .expect("merge scalar");
    store
        .merge_entry(
            DocumentId::Dashboard,
            "health_heartbeat",
            "work_split",
            json!({"ok": true}),
        )
        .expect("entry into scalar section");

    let doc = store.read(DocumentId::Dashboard);
    assert_eq!(doc["health_heartbeat"]["work_split"]["ok"], true);
}
