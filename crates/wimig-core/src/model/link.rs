use serde::{Deserialize, Serialize};
use std::fmt;

use super::item::OriginId;

/// Direction of a link mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceChangeType {
    Added,
    Removed,
}

impl ReferenceChangeType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }

    /// One-character marker used in line-oriented output.
    #[must_use]
    pub const fn sigil(self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
        }
    }
}

impl fmt::Display for ReferenceChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single add/remove link operation destined for the target tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiLink {
    pub change: ReferenceChangeType,
    pub source_origin_id: OriginId,
    pub target_origin_id: String,
    /// Target-side link type, empty when the source type has no mapping.
    pub wi_type: String,
}

impl fmt::Display for WiLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} [{}]",
            self.change.sigil(),
            self.source_origin_id,
            self.target_origin_id,
            self.wi_type
        )
    }
}
