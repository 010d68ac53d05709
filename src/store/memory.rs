//! In-memory document store for tests

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use super::{set_nested, DocumentId, DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<DocumentId, Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with initial content.
    pub fn put(&self, doc: DocumentId, content: Map<String, Value>) {
        let mut docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        docs.insert(doc, content);
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, doc: DocumentId) -> Map<String, Value> {
        let docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        docs.get(&doc).cloned().unwrap_or_default()
    }

    fn merge_section(&self, doc: DocumentId, section: &str, value: Value) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        docs.entry(doc)
            .or_default()
            .insert(section.to_string(), value);
        Ok(())
    }

    fn merge_entry(
        &self,
        doc: DocumentId,
        section: &str,
        entry: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        set_nested(docs.entry(doc).or_default(), section, entry, value);
        Ok(())
    }
}
