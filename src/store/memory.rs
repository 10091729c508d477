use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

use crate::model::{EntityKind, Filter, Id, Query};
use crate::store::traits::DocumentStore;

/// In-process document store. Each collection keeps insertion order, which is
/// the natural order `find` returns when no sort is requested.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<EntityKind, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections
    pub fn len(&self) -> usize {
        self.collections.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn document_id(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_id(&self, kind: EntityKind, id: &Id) -> Result<Option<Value>> {
        let collections = self.collections.read();
        Ok(collections.get(&kind).and_then(|documents| {
            documents
                .iter()
                .find(|d| document_id(d) == Some(id.as_str()))
                .cloned()
        }))
    }

    async fn find(&self, kind: EntityKind, query: &Query) -> Result<Vec<Value>> {
        let mut matched: Vec<Value> = {
            let collections = self.collections.read();
            collections
                .get(&kind)
                .map(|documents| {
                    documents
                        .iter()
                        .filter(|d| query.filter.matches(d))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(matched
            .into_iter()
            .map(|d| query.apply_projection(d))
            .collect())
    }

    async fn count(&self, kind: EntityKind, filter: &Filter) -> Result<u64> {
        let collections = self.collections.read();
        let count = collections
            .get(&kind)
            .map(|documents| documents.iter().filter(|d| filter.matches(d)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn save(&self, kind: EntityKind, id: &Id, document: Value) -> Result<()> {
        if document_id(&document) != Some(id.as_str()) {
            return Err(anyhow!("{} document id does not match '{}'", kind, id));
        }

        let mut collections = self.collections.write();
        let documents = collections.entry(kind).or_default();
        match documents
            .iter_mut()
            .find(|d| document_id(d) == Some(id.as_str()))
        {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
        Ok(())
    }

    async fn delete_by_id(&self, kind: EntityKind, id: &Id) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(&kind) else {
            return Ok(false);
        };

        let before = documents.len();
        documents.retain(|d| document_id(d) != Some(id.as_str()));
        Ok(documents.len() < before)
    }
}
