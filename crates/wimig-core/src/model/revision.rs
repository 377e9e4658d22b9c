use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::item::{OriginId, WorkItem};

/// A loosely-typed field value from a source revision snapshot.
///
/// A field missing from the snapshot map is *absent*; [`FieldValue::Null`]
/// is a field that is present but empty. The reconcilers treat the two
/// differently.
///
/// Snapshots carry the item's whole field state, so values no link field
/// ever holds (booleans, lists, objects) are kept as [`FieldValue::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    /// The value as a link target key, or `None` when it carries nothing.
    ///
    /// Blank strings count as empty, so no link is ever emitted with a blank
    /// target. Only integers and text can name an item.
    #[must_use]
    pub fn as_link_key(&self) -> Option<String> {
        match self {
            Self::Null | Self::Other(_) => None,
            Self::Number(n) => n.as_i64().map(|i| i.to_string()),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s.clone()),
        }
    }

    /// The value as a signed integer, if it is a whole number in range.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// One historical snapshot of a work item's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    item: OriginId,
    index: usize,
    time: DateTime<Utc>,
    fields: BTreeMap<String, FieldValue>,
}

impl Revision {
    pub(crate) const fn new(
        item: OriginId,
        index: usize,
        time: DateTime<Utc>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Self {
        Self {
            item,
            index,
            time,
            fields,
        }
    }

    /// Origin id of the owning work item.
    #[must_use]
    pub const fn item(&self) -> &OriginId {
        &self.item
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Replay time. Overwritten by the execution planner with the time the
    /// revision was ordered at.
    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub(crate) const fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }

    /// The field as carried by this snapshot; `None` if absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// A revision together with the work item that owns it.
#[derive(Debug, Clone, Copy)]
pub struct RevisionRef<'a> {
    item: &'a WorkItem,
    revision: &'a Revision,
}

impl<'a> RevisionRef<'a> {
    pub(crate) const fn new(item: &'a WorkItem, revision: &'a Revision) -> Self {
        Self { item, revision }
    }

    #[must_use]
    pub const fn item(&self) -> &'a WorkItem {
        self.item
    }

    #[must_use]
    pub const fn revision(&self) -> &'a Revision {
        self.revision
    }

    #[must_use]
    pub const fn origin_id(&self) -> &'a OriginId {
        self.item.origin_id()
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.revision.index()
    }

    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        self.revision.time()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'a FieldValue> {
        self.revision.field(name)
    }

    /// Value of `field` as of the revision just before this one.
    #[must_use]
    pub fn previous_value(&self, field: &str) -> Option<&'a FieldValue> {
        let prev = self.index().checked_sub(1)?;
        self.item.field_value_at(field, prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_deserializes_loose_json() {
        let parsed: BTreeMap<String, FieldValue> =
            serde_json::from_str(r#"{"a": null, "b": 777, "c": "PROJ-9"}"#).expect("parse");
        assert_eq!(parsed["a"], FieldValue::Null);
        assert_eq!(parsed["b"], FieldValue::from(777));
        assert_eq!(parsed["c"], FieldValue::Text("PROJ-9".into()));
    }

    #[test]
    fn non_key_values_are_kept() {
        let parsed: BTreeMap<String, FieldValue> = serde_json::from_str(
            r#"{"points": 3.5, "flagged": true, "labels": ["a", "b"], "meta": {"k": 1}}"#,
        )
        .expect("parse");
        assert!(matches!(parsed["points"], FieldValue::Number(_)));
        assert_eq!(parsed["points"].to_string(), "3.5");
        assert_eq!(parsed["flagged"], FieldValue::Other(serde_json::Value::Bool(true)));
        assert!(matches!(parsed["labels"], FieldValue::Other(_)));
        assert!(matches!(parsed["meta"], FieldValue::Other(_)));

        for value in parsed.values() {
            assert_eq!(value.as_link_key(), None);
            assert_eq!(value.as_integer(), None);
        }
    }

    #[test]
    fn link_key_treats_null_and_blank_as_empty() {
        assert_eq!(FieldValue::Null.as_link_key(), None);
        assert_eq!(FieldValue::from("  ").as_link_key(), None);
        assert_eq!(FieldValue::from(12).as_link_key(), Some("12".into()));
        assert_eq!(FieldValue::from(-3).as_integer(), Some(-3));
        assert_eq!(FieldValue::from("PROJ-1").as_link_key(), Some("PROJ-1".into()));
    }

    #[test]
    fn first_revision_has_no_previous_value() {
        let mut item = WorkItem::new("PROJ-2", "Task");
        let mut fields = BTreeMap::new();
        fields.insert("parent".to_string(), FieldValue::from("PROJ-1"));
        item.push_revision(DateTime::<Utc>::UNIX_EPOCH, fields);

        let rev = item.revision(0).expect("revision 0");
        assert_eq!(rev.previous_value("parent"), None);
        assert_eq!(rev.field("parent"), Some(&FieldValue::from("PROJ-1")));
    }
}
