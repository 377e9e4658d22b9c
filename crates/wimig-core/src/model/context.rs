//! The migration directory: every work item known to a run, keyed by
//! origin id.
//!
//! Relations between items (revision → item, item → parent) are stored as
//! [`OriginId`] keys and resolved through this directory.

use std::collections::BTreeMap;

use super::item::{OriginId, WorkItem};
use crate::error::ErrorCode;

/// Errors from directory maintenance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("work item {0} is already registered")]
    DuplicateItem(OriginId),

    #[error("work item {0} not found")]
    ItemNotFound(String),
}

impl ContextError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateItem(_) => ErrorCode::DuplicateItem,
            Self::ItemNotFound(_) => ErrorCode::ItemNotFound,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationContext {
    items: BTreeMap<OriginId, WorkItem>,
}

impl MigrationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a work item.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::DuplicateItem`] if the origin id is taken.
    pub fn insert(&mut self, item: WorkItem) -> Result<(), ContextError> {
        if self.items.contains_key(item.origin_id()) {
            return Err(ContextError::DuplicateItem(item.origin_id().clone()));
        }
        self.items.insert(item.origin_id().clone(), item);
        Ok(())
    }

    #[must_use]
    pub fn get_item(&self, origin_id: &str) -> Option<&WorkItem> {
        self.items.get(origin_id)
    }

    pub(crate) fn get_item_mut(&mut self, origin_id: &str) -> Option<&mut WorkItem> {
        self.items.get_mut(origin_id)
    }

    /// Record the target-tracker id assigned to an item after creation.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ItemNotFound`] for an unknown origin id.
    pub fn assign_wi_id(&mut self, origin_id: &str, wi_id: i64) -> Result<(), ContextError> {
        let item = self
            .items
            .get_mut(origin_id)
            .ok_or_else(|| ContextError::ItemNotFound(origin_id.to_string()))?;
        item.set_wi_id(wi_id);
        Ok(())
    }

    /// Items in origin-id order.
    pub fn items(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<WorkItem> for MigrationContext {
    /// Later items with an already-seen origin id replace earlier ones.
    fn from_iter<I: IntoIterator<Item = WorkItem>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|item| (item.origin_id().clone(), item))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicates() {
        let mut ctx = MigrationContext::new();
        ctx.insert(WorkItem::new("PROJ-1", "Epic")).expect("first insert");
        let err = ctx
            .insert(WorkItem::new("PROJ-1", "Story"))
            .expect_err("duplicate must fail");
        assert_eq!(err.code(), ErrorCode::DuplicateItem);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get_item("PROJ-1").map(WorkItem::wi_type), Some("Epic"));
    }

    #[test]
    fn assign_wi_id_records_target_id() {
        let mut ctx: MigrationContext = [WorkItem::new("PROJ-1", "Epic")].into_iter().collect();
        assert_eq!(ctx.get_item("PROJ-1").and_then(WorkItem::wi_id), None);

        ctx.assign_wi_id("PROJ-1", 4021).expect("assign");
        assert_eq!(ctx.get_item("PROJ-1").and_then(WorkItem::wi_id), Some(4021));

        let err = ctx.assign_wi_id("PROJ-404", 1).expect_err("unknown item");
        assert_eq!(err, ContextError::ItemNotFound("PROJ-404".into()));
    }
}
