use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{CopyStatus, EntityKind, Filter, Outcome, View};
use crate::store::traits::Store;

pub const WORK_COUNT: &str = "work_count";
pub const COPY_COUNT: &str = "copy_count";
pub const COPY_AVAILABLE_COUNT: &str = "copy_available_count";
pub const CREATOR_COUNT: &str = "creator_count";
pub const TAG_COUNT: &str = "tag_count";

/// Catalog totals for the home page. Counts that could not be read are left
/// out of `counts` and listed in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub counts: BTreeMap<&'static str, u64>,
    pub failures: BTreeMap<&'static str, String>,
    /// Set whenever at least one count failed
    pub error: Option<String>,
}

impl DashboardSummary {
    pub fn count(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, key: &'static str, result: anyhow::Result<u64>) {
        match result {
            Ok(count) => {
                self.counts.insert(key, count);
            }
            Err(e) => {
                log::warn!("Dashboard count '{}' failed: {:#}", key, e);
                self.failures.insert(key, format!("{:#}", e));
            }
        }
    }
}

/// Runs the five counts concurrently. A failing count never fails the others.
pub async fn collect<S: Store>(store: &S) -> DashboardSummary {
    let all = Filter::all();
    let available = Filter::eq("status", CopyStatus::Available.as_str());

    let (works, copies, copies_available, creators, tags) = tokio::join!(
        store.count(EntityKind::Work, &all),
        store.count(EntityKind::Copy, &all),
        store.count(EntityKind::Copy, &available),
        store.count(EntityKind::Creator, &all),
        store.count(EntityKind::Tag, &all),
    );

    let mut summary = DashboardSummary::default();
    summary.record(WORK_COUNT, works);
    summary.record(COPY_COUNT, copies);
    summary.record(COPY_AVAILABLE_COUNT, copies_available);
    summary.record(CREATOR_COUNT, creators);
    summary.record(TAG_COUNT, tags);

    if !summary.failures.is_empty() {
        let failed: Vec<&str> = summary.failures.keys().copied().collect();
        summary.error = Some(format!("Could not load: {}", failed.join(", ")));
    }

    summary
}

/// Home page. Counts that failed are simply missing from the view.
pub async fn index<S: Store>(store: &S) -> Outcome {
    let summary = collect(store).await;

    let mut view = View::new("index", "Catalog Home");
    for (key, count) in &summary.counts {
        view.insert(key, count);
    }
    view.insert("error", &summary.error);
    Outcome::Render(view)
}
