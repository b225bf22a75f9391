//! The document-store contract and an in-memory implementation.
//!
//! The backend is an external collaborator with a key/value
//! save-find-remove API. Calls are synchronous and blocking; failures
//! propagate unchanged to the caller. `MemoryBackend` serves tests and
//! embedded use.

use std::collections::HashMap;
use std::sync::Mutex;

use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// A persisted document: field name → projected value.
pub type Document = serde_json::Map<String, Value>;

/// Synchronous document-store contract.
pub trait Backend: Send + Sync {
    /// Store a document under a kind. `existing_id` pins the identifier;
    /// otherwise the document's own `_id` is used, or the backend
    /// generates one. Returns the identifier the document is stored under.
    fn save(&self, kind: &str, document: Document, existing_id: Option<&str>) -> Result<String>;

    /// Documents of a kind matching every entry of the filter. An empty
    /// filter matches all.
    fn find(&self, kind: &str, filter: &Document) -> Result<Vec<Document>>;

    /// Remove every document of a kind matching the filter.
    fn remove(&self, kind: &str, filter: &Document) -> Result<()>;
}

/// In-memory backend: one ordered id → document map per kind.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: Mutex<HashMap<String, IndexMap<String, Document>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(document: &Document, filter: &Document) -> bool {
        filter
            .iter()
            .all(|(key, value)| document.get(key) == Some(value))
    }
}

impl Backend for MemoryBackend {
    fn save(&self, kind: &str, mut document: Document, existing_id: Option<&str>) -> Result<String> {
        let id = existing_id
            .map(str::to_owned)
            .or_else(|| document.get("_id").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        document.insert("_id".into(), Value::String(id.clone()));

        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(kind.to_string())
            .or_default()
            .insert(id.clone(), document);
        Ok(id)
    }

    fn find(&self, kind: &str, filter: &Document) -> Result<Vec<Document>> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(kind)
            .map(|docs| {
                docs.values()
                    .filter(|doc| Self::matches(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn remove(&self, kind: &str, filter: &Document) -> Result<()> {
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(docs) = collections.get_mut(kind) {
            docs.retain(|_, doc| !Self::matches(doc, filter));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(pairs: &[(&str, Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn save_generates_id_when_absent() {
        let backend = MemoryBackend::new();
        let id = backend
            .save("order", doc(&[("status", json!("open"))]), None)
            .unwrap();
        assert!(!id.is_empty());

        let found = backend.find("order", &Document::new()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("_id"), Some(&json!(id)));
    }

    #[test]
    fn save_prefers_existing_id() {
        let backend = MemoryBackend::new();
        let id = backend
            .save(
                "order",
                doc(&[("_id", json!("doc-id")), ("status", json!("open"))]),
                Some("pinned"),
            )
            .unwrap();
        assert_eq!(id, "pinned");
    }

    #[test]
    fn save_uses_document_id() {
        let backend = MemoryBackend::new();
        let id = backend
            .save("order", doc(&[("_id", json!("doc-id"))]), None)
            .unwrap();
        assert_eq!(id, "doc-id");
    }

    #[test]
    fn save_same_id_overwrites() {
        let backend = MemoryBackend::new();
        backend
            .save("order", doc(&[("status", json!("open"))]), Some("x"))
            .unwrap();
        backend
            .save("order", doc(&[("status", json!("closed"))]), Some("x"))
            .unwrap();

        let found = backend.find("order", &Document::new()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("status"), Some(&json!("closed")));
    }

    #[test]
    fn find_filters_by_subset() {
        let backend = MemoryBackend::new();
        backend
            .save("order", doc(&[("status", json!("open"))]), None)
            .unwrap();
        backend
            .save("order", doc(&[("status", json!("closed"))]), None)
            .unwrap();

        let open = backend
            .find("order", &doc(&[("status", json!("open"))]))
            .unwrap();
        assert_eq!(open.len(), 1);

        let none = backend
            .find("order", &doc(&[("status", json!("pending"))]))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn kinds_are_isolated() {
        let backend = MemoryBackend::new();
        backend.save("order", Document::new(), None).unwrap();
        assert!(backend.find("invoice", &Document::new()).unwrap().is_empty());
    }

    #[test]
    fn remove_by_filter() {
        let backend = MemoryBackend::new();
        backend
            .save("order", doc(&[("status", json!("open"))]), None)
            .unwrap();
        backend
            .save("order", doc(&[("status", json!("closed"))]), None)
            .unwrap();

        backend
            .remove("order", &doc(&[("status", json!("open"))]))
            .unwrap();
        let rest = backend.find("order", &Document::new()).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].get("status"), Some(&json!("closed")));
    }
}
