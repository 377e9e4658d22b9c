//! Resolve-and-pop over the revision reference queue.
//!
//! [`ExecutionPlan::try_pop`] dequeues the head [`RevisionReference`],
//! resolves it against the [`MigrationContext`], stamps the reference time
//! onto the stored revision and hands back an [`ExecutionItem`]. The queue
//! is drained in insertion order with no re-sorting or look-ahead; global
//! ordering is the job of whoever built the queue (see
//! [`order_revisions`](super::order_revisions)).
//!
//! Popping is destructive. A popped reference that fails to resolve is not
//! put back.

use std::collections::VecDeque;
use std::fmt;

use super::order::order_revisions;
use super::reference::RevisionReference;
use crate::error::ErrorCode;
use crate::model::{MigrationContext, OriginId, RevisionRef};

/// Contract violations between the reference queue and the loaded items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("revision reference points at unknown work item {0}")]
    ItemNotFound(OriginId),

    #[error("revision {index} of {origin_id} is out of range ({len} revisions)")]
    RevisionOutOfRange {
        origin_id: OriginId,
        index: usize,
        len: usize,
    },
}

impl PlanError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ItemNotFound(_) => ErrorCode::ItemNotFound,
            Self::RevisionOutOfRange { .. } => ErrorCode::RevisionOutOfRange,
        }
    }
}

/// A resolved, ready-to-replay revision.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionItem<'a> {
    pub origin_id: &'a OriginId,
    /// Target-tracker id, `None` until the item has been created there.
    pub wi_id: Option<i64>,
    pub wi_type: &'a str,
    pub revision: RevisionRef<'a>,
    pub is_final: bool,
}

impl fmt::Display for ExecutionItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}, {}",
            self.origin_id,
            self.wi_id.unwrap_or(-1),
            self.revision.index()
        )
    }
}

/// A single-consumer queue of revision references bound to the directory
/// they resolve against.
#[derive(Debug)]
pub struct ExecutionPlan<'c> {
    reference_queue: VecDeque<RevisionReference>,
    context: &'c mut MigrationContext,
}

impl<'c> ExecutionPlan<'c> {
    /// Build a plan from references that are already in replay order.
    pub fn new(
        ordered_references: impl IntoIterator<Item = RevisionReference>,
        context: &'c mut MigrationContext,
    ) -> Self {
        Self {
            reference_queue: ordered_references.into_iter().collect(),
            context,
        }
    }

    /// Build a plan covering every revision in `context`, in global
    /// chronological order.
    pub fn from_context(context: &'c mut MigrationContext) -> Self {
        let references = order_revisions(context);
        Self::new(references, context)
    }

    /// Pop and resolve the next revision.
    ///
    /// Returns `Ok(None)` once the queue is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::ItemNotFound`] if the reference names an item not
    /// in the context, or [`PlanError::RevisionOutOfRange`] if the item has no
    /// revision at the referenced index. Either way the reference has been
    /// consumed; callers should abort the run.
    pub fn try_pop(&mut self) -> Result<Option<ExecutionItem<'_>>, PlanError> {
        let Some(reference) = self.reference_queue.pop_front() else {
            return Ok(None);
        };

        let item = self
            .context
            .get_item_mut(reference.origin_id.as_str())
            .ok_or_else(|| PlanError::ItemNotFound(reference.origin_id.clone()))?;
        let len = item.revisions().len();

        let revision = item
            .stamp_revision(reference.rev_index, reference.time)
            .ok_or_else(|| PlanError::RevisionOutOfRange {
                origin_id: reference.origin_id.clone(),
                index: reference.rev_index,
                len,
            })?;

        tracing::trace!(
            origin_id = %reference.origin_id,
            rev = reference.rev_index,
            is_final = reference.is_final,
            "resolved revision"
        );

        let item = revision.item();
        Ok(Some(ExecutionItem {
            origin_id: item.origin_id(),
            wi_id: item.wi_id(),
            wi_type: item.wi_type(),
            revision,
            is_final: reference.is_final,
        }))
    }

    /// Number of references not yet popped.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.reference_queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference_queue.is_empty()
    }

    /// Mutable access between pops, e.g. to record assigned target ids.
    pub fn context_mut(&mut self) -> &mut MigrationContext {
        &mut *self.context
    }
}
