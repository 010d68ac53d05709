//! File-backed document store
//!
//! Each document is a pretty-printed UTF-8 JSON file under the root
//! directory, terminated with a single trailing newline. serde_json's
//! object maps are key-ordered, so repeated no-op runs produce
//! byte-identical files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::warn;

use super::{set_nested, DocumentId, DocumentStore, StoreError};

pub struct FileStore {
    root: PathBuf,
    // One global lock: all document mutations serialize through it so
    // concurrent /run invocations cannot lose a section update.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self, doc: DocumentId) -> PathBuf {
        self.root.join(doc.file_name())
    }

    fn load(&self, doc: DocumentId) -> Map<String, Value> {
        let path = self.path(doc);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => return Map::new(),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = %path.display(), "document is not a JSON object, reading as empty");
                Map::new()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed document, reading as empty");
                Map::new()
            }
        }
    }

    fn persist(&self, doc: DocumentId, content: Map<String, Value>) -> Result<(), StoreError> {
        let path = self.path(doc);
        let mut text = serde_json::to_string_pretty(&Value::Object(content)).map_err(|source| {
            StoreError::Serialize {
                doc: doc.file_name(),
                source,
            }
        })?;
        text.push('\n');
        write_text(&path, &text)
    }
}

fn write_text(path: &Path, text: &str) -> Result<(), StoreError> {
    fs::write(path, text).map_err(|source| StoreError::Write {
        path: path.display().to_string(),
        source,
    })
}

impl DocumentStore for FileStore {
    fn read(&self, doc: DocumentId) -> Map<String, Value> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load(doc)
    }

    fn merge_section(&self, doc: DocumentId, section: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut content = self.load(doc);
        content.insert(section.to_string(), value);
        self.persist(doc, content)
    }

    fn merge_entry(
        &self,
        doc: DocumentId,
        section: &str,
        entry: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut content = self.load(doc);
        set_nested(&mut content, section, entry, value);
        self.persist(doc, content)
    }
}
