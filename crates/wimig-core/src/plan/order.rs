//! Global chronological ordering of revisions across all work items.
//!
//! Produces the reference queue the [`ExecutionPlan`](super::ExecutionPlan)
//! drains. Ordering is deterministic: `(time, origin_id, rev_index)`.
//!
//! Within one item the history order is authoritative. A revision whose
//! stored time is earlier than a preceding revision of the same item is
//! clamped up to that preceding time, so no item is ever replayed out of
//! index order.

use chrono::{DateTime, Utc};

use super::reference::RevisionReference;
use crate::model::MigrationContext;

/// Build the ordered reference queue for every revision in `context`.
#[must_use]
pub fn order_revisions(context: &MigrationContext) -> Vec<RevisionReference> {
    let mut refs = Vec::new();

    for item in context.items() {
        let last = item.revisions().len().checked_sub(1);
        let mut floor: Option<DateTime<Utc>> = None;

        for revision in item.revisions() {
            let stored = revision.time();
            let time = floor.map_or(stored, |f| f.max(stored));
            if time != stored {
                tracing::debug!(
                    origin_id = %item.origin_id(),
                    rev = revision.index(),
                    stored = %stored,
                    clamped = %time,
                    "revision time precedes its predecessor; clamping"
                );
            }
            floor = Some(time);

            refs.push(RevisionReference {
                origin_id: item.origin_id().clone(),
                rev_index: revision.index(),
                time,
                is_final: Some(revision.index()) == last,
            });
        }
    }

    refs.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then_with(|| a.origin_id.cmp(&b.origin_id))
            .then_with(|| a.rev_index.cmp(&b.rev_index))
    });

    tracing::debug!(revisions = refs.len(), items = context.len(), "ordered revisions");
    refs
}
