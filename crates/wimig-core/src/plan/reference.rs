use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::OriginId;

/// Pointer to one revision in the global replay order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionReference {
    pub origin_id: OriginId,
    pub rev_index: usize,
    /// Time the revision is ordered at; stamped onto the revision when popped.
    pub time: DateTime<Utc>,
    /// True for the chronologically last revision of the item.
    pub is_final: bool,
}

impl RevisionReference {
    pub fn new(
        origin_id: impl Into<OriginId>,
        rev_index: usize,
        time: DateTime<Utc>,
        is_final: bool,
    ) -> Self {
        Self {
            origin_id: origin_id.into(),
            rev_index,
            time,
            is_final,
        }
    }
}

impl fmt::Display for RevisionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @rev {} {}",
            self.origin_id,
            self.rev_index,
            self.time.to_rfc3339()
        )?;
        if self.is_final {
            f.write_str(" (final)")?;
        }
        Ok(())
    }
}
