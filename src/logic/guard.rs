use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::model::{Document, EntityKind, Filter, Id, PhysicalCopy, Query, Work};
use crate::store::traits::Store;

/// A record that holds a reference to the delete target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Blocker {
    Work(Work),
    Copy(PhysicalCopy),
}

impl Blocker {
    pub fn id(&self) -> &Id {
        match self {
            Blocker::Work(work) => &work.id,
            Blocker::Copy(copy) => &copy.id,
        }
    }

    pub fn to_view(&self) -> Value {
        match self {
            Blocker::Work(work) => work.to_view(),
            Blocker::Copy(copy) => copy.to_view(),
        }
    }
}

/// Result of asking whether a record may be deleted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteCheck {
    pub kind: EntityKind,
    pub id: Id,
    /// The record itself, `None` when it is already gone
    pub target: Option<Value>,
    pub allowed: bool,
    pub blockers: Vec<Blocker>,
}

impl DeleteCheck {
    /// The target decoded as its record type
    pub fn target_as<D: Document>(&self) -> Option<D> {
        self.target
            .clone()
            .and_then(|document| serde_json::from_value(document).ok())
    }

    pub fn blocker_views(&self) -> Vec<Value> {
        self.blockers.iter().map(Blocker::to_view).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete; treated as success
    AlreadyAbsent,
    Blocked(DeleteCheck),
}

/// Which collection references `kind`, and through which field
fn dependents_of(kind: EntityKind) -> Option<(EntityKind, &'static str)> {
    match kind {
        EntityKind::Creator => Some((EntityKind::Work, "creator")),
        EntityKind::Tag => Some((EntityKind::Work, "tags")),
        EntityKind::Work => Some((EntityKind::Copy, "work")),
        EntityKind::Copy => None,
    }
}

async fn find_blockers<S: Store>(store: &S, kind: EntityKind, id: &Id) -> Result<Vec<Blocker>> {
    let Some((dependent_kind, field)) = dependents_of(kind) else {
        return Ok(Vec::new());
    };

    let query = Query::filtered(Filter::eq(field, id.as_str()));
    let blockers = match dependent_kind {
        EntityKind::Work => store
            .list::<Work>(&query)
            .await?
            .into_iter()
            .map(Blocker::Work)
            .collect(),
        EntityKind::Copy => store
            .list::<PhysicalCopy>(&query)
            .await?
            .into_iter()
            .map(Blocker::Copy)
            .collect(),
        EntityKind::Creator | EntityKind::Tag => Vec::new(),
    };
    Ok(blockers)
}

/// Looks up the target and everything referencing it, concurrently.
///
/// A missing target is allowed: deleting it is a no-op. Copies are never
/// referenced, so they are always allowed.
pub async fn can_delete<S: Store>(store: &S, kind: EntityKind, id: &Id) -> Result<DeleteCheck> {
    let (target, blockers) = tokio::try_join!(
        store.find_by_id(kind, id),
        find_blockers(store, kind, id)
    )?;

    let allowed = target.is_none() || blockers.is_empty();
    Ok(DeleteCheck {
        kind,
        id: id.clone(),
        target,
        allowed,
        blockers,
    })
}

/// Deletes a single record once nothing references it. Never cascades.
///
/// The check and the delete are two separate store calls; a reference created
/// in between is not detected.
pub async fn delete<S: Store>(store: &S, kind: EntityKind, id: &Id) -> Result<DeleteOutcome> {
    let check = can_delete(store, kind, id).await?;

    if check.target.is_none() {
        log::debug!("{} {} already absent, nothing to delete", kind, id);
        return Ok(DeleteOutcome::AlreadyAbsent);
    }

    if !check.allowed {
        log::info!(
            "Refusing to delete {} {}: {} dependent record(s)",
            kind,
            id,
            check.blockers.len()
        );
        return Ok(DeleteOutcome::Blocked(check));
    }

    if store.delete_by_id(kind, id).await? {
        log::info!("Deleted {} {}", kind, id);
        Ok(DeleteOutcome::Deleted)
    } else {
        Ok(DeleteOutcome::AlreadyAbsent)
    }
}
