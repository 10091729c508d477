use crate::error::{CatalogError, CatalogResult};
use crate::model::{Document, Id};
use crate::store::traits::Store;

/// Fetches a record that has to exist
pub async fn require<D: Document, S: Store>(store: &S, id: &Id) -> CatalogResult<D> {
    store
        .get::<D>(id)
        .await?
        .ok_or_else(|| CatalogError::not_found(D::KIND, id))
}

/// Turns an absent primary record into a not-found error
pub fn found<D: Document>(record: Option<D>, id: &Id) -> CatalogResult<D> {
    record.ok_or_else(|| CatalogError::not_found(D::KIND, id))
}
