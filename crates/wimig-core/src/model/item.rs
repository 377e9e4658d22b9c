use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use super::revision::{FieldValue, Revision, RevisionRef};

/// Stable key of a work item in the source tracker (e.g. `PROJ-123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(String);

impl OriginId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer after the last `-` of the key (`PROJ-123` → `123`).
    ///
    /// A key without any `-` is parsed whole. Returns `None` when the tail
    /// is not an integer.
    #[must_use]
    pub fn numeric_suffix(&self) -> Option<i64> {
        numeric_suffix(&self.0)
    }
}

pub(crate) fn numeric_suffix(key: &str) -> Option<i64> {
    let tail = key.rsplit_once('-').map_or(key, |(_, tail)| tail);
    tail.trim().parse().ok()
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for OriginId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OriginId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for OriginId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// A source work item and its full revision history.
///
/// Revisions are append-only: [`WorkItem::push_revision`] assigns the next
/// contiguous index, so `revisions()[i].index() == i` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    origin_id: OriginId,
    wi_id: Option<i64>,
    wi_type: String,
    parent: Option<OriginId>,
    revisions: Vec<Revision>,
}

impl WorkItem {
    pub fn new(origin_id: impl Into<OriginId>, wi_type: impl Into<String>) -> Self {
        Self {
            origin_id: origin_id.into(),
            wi_id: None,
            wi_type: wi_type.into(),
            parent: None,
            revisions: Vec::new(),
        }
    }

    /// Set the resolved parent key.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<OriginId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub const fn origin_id(&self) -> &OriginId {
        &self.origin_id
    }

    /// Identifier in the target tracker, once the item has been created there.
    #[must_use]
    pub const fn wi_id(&self) -> Option<i64> {
        self.wi_id
    }

    pub(crate) const fn set_wi_id(&mut self, wi_id: i64) {
        self.wi_id = Some(wi_id);
    }

    #[must_use]
    pub fn wi_type(&self) -> &str {
        &self.wi_type
    }

    /// Resolved parent key. This is a lookup key into the
    /// [`MigrationContext`](super::MigrationContext), not an owned item.
    #[must_use]
    pub const fn parent(&self) -> Option<&OriginId> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Append a revision snapshot and return its index.
    pub fn push_revision(
        &mut self,
        time: DateTime<Utc>,
        fields: BTreeMap<String, FieldValue>,
    ) -> usize {
        let index = self.revisions.len();
        self.revisions
            .push(Revision::new(self.origin_id.clone(), index, time, fields));
        index
    }

    /// Borrowed view of revision `index`, if it exists.
    #[must_use]
    pub fn revision(&self, index: usize) -> Option<RevisionRef<'_>> {
        self.revisions
            .get(index)
            .map(|revision| RevisionRef::new(self, revision))
    }

    /// Overwrite the replay time of revision `index` and return a view of it.
    pub(crate) fn stamp_revision(
        &mut self,
        index: usize,
        time: DateTime<Utc>,
    ) -> Option<RevisionRef<'_>> {
        self.revisions.get_mut(index)?.set_time(time);
        self.revision(index)
    }

    /// Latest value of `field` as of revision `index`.
    ///
    /// Walks backwards from `index` to the nearest revision that carries the
    /// field at all. `Some(FieldValue::Null)` means the field was explicitly
    /// cleared; `None` means no revision up to `index` ever carried it.
    #[must_use]
    pub fn field_value_at(&self, field: &str, index: usize) -> Option<&FieldValue> {
        let end = index.checked_add(1)?.min(self.revisions.len());
        self.revisions[..end]
            .iter()
            .rev()
            .find_map(|revision| revision.field(field))
    }
}
