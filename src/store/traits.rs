use anyhow::{Context, Result};
use serde_json::Value;

use crate::model::{Document, EntityKind, Filter, Id, Query};

/// Raw document access over the four catalog collections
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_by_id(&self, kind: EntityKind, id: &Id) -> Result<Option<Value>>;
    async fn find(&self, kind: EntityKind, query: &Query) -> Result<Vec<Value>>;
    async fn count(&self, kind: EntityKind, filter: &Filter) -> Result<u64>;
    /// Insert or replace by identity
    async fn save(&self, kind: EntityKind, id: &Id, document: Value) -> Result<()>;
    /// Returns false when there was nothing to delete
    async fn delete_by_id(&self, kind: EntityKind, id: &Id) -> Result<bool>;

    async fn find_one_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>> {
        let query = Query::filtered(Filter::eq(field, value.clone()));
        Ok(self.find(kind, &query).await?.into_iter().next())
    }
}

/// Typed access on top of any document store
#[async_trait::async_trait]
pub trait CatalogStore: DocumentStore {
    async fn get<D: Document>(&self, id: &Id) -> Result<Option<D>> {
        match self.find_by_id(D::KIND, id).await? {
            Some(document) => Ok(Some(decode(D::KIND, document)?)),
            None => Ok(None),
        }
    }

    async fn list<D: Document>(&self, query: &Query) -> Result<Vec<D>> {
        self.find(D::KIND, query)
            .await?
            .into_iter()
            .map(|document| decode(D::KIND, document))
            .collect()
    }

    async fn get_by_field<D: Document>(&self, field: &str, value: &Value) -> Result<Option<D>> {
        match self.find_one_by_field(D::KIND, field, value).await? {
            Some(document) => Ok(Some(decode(D::KIND, document)?)),
            None => Ok(None),
        }
    }

    async fn put<D: Document>(&self, record: &D) -> Result<()> {
        let document = serde_json::to_value(record)
            .with_context(|| format!("Failed to encode {} {}", D::KIND, record.id()))?;
        self.save(D::KIND, record.id(), document).await
    }
}

impl<T: DocumentStore + ?Sized> CatalogStore for T {}

pub trait Store: CatalogStore + Send + Sync {}
impl<T: DocumentStore> Store for T {}

fn decode<D: Document>(kind: EntityKind, document: Value) -> Result<D> {
    serde_json::from_value(document).with_context(|| format!("Malformed {} document", kind))
}
