//! Approvals feed state held by the presentation layer.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::approval::ApprovedIngredient;
use crate::reference::seed_approvals;

/// The approvals currently on display.
///
/// An empty refresh means "nothing new could be fetched", so it never clears
/// the feed: the last good set of items stays in place.
#[derive(Debug, Clone)]
pub struct ApprovalFeed {
    items: Vec<ApprovedIngredient>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Default for ApprovalFeed {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ApprovalFeed {
    /// Feed populated from the static seed table.
    pub fn seeded() -> Self {
        Self::with_items(seed_approvals())
    }

    pub fn with_items(items: Vec<ApprovedIngredient>) -> Self {
        Self {
            items,
            refreshed_at: None,
        }
    }

    pub fn items(&self) -> &[ApprovedIngredient] {
        &self.items
    }

    /// When the items were last replaced by a refresh. `None` for seed data.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Apply the outcome of a refresh. Returns `true` if the items were replaced.
    pub fn apply_refresh(&mut self, latest: Vec<ApprovedIngredient>) -> bool {
        if latest.is_empty() {
            info!(kept = self.items.len(), "refresh returned nothing, keeping previous feed");
            return false;
        }
        info!(count = latest.len(), "approvals feed replaced");
        self.items = latest;
        self.refreshed_at = Some(Utc::now());
        true
    }
}
