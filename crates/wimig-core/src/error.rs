use std::fmt;

/// Machine-readable error codes for operators and migration scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    BlankLinkField,
    BlankLinkType,
    ExportParseError,
    ItemNotFound,
    RevisionOutOfRange,
    DuplicateItem,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::BlankLinkField => "E1002",
            Self::BlankLinkType => "E1003",
            Self::ExportParseError => "E1004",
            Self::ItemNotFound => "E2001",
            Self::RevisionOutOfRange => "E2002",
            Self::DuplicateItem => "E2003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::BlankLinkField => "Link rule has a blank field name",
            Self::BlankLinkType => "Link rule has a blank link type",
            Self::ExportParseError => "Export file parse error",
            Self::ItemNotFound => "Work item not found",
            Self::RevisionOutOfRange => "Revision index out of range",
            Self::DuplicateItem => "Duplicate work item origin id",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the migration config and retry."),
            Self::BlankLinkField | Self::BlankLinkType => {
                Some("Every link rule needs a non-blank `field` and `link_type`.")
            }
            Self::ExportParseError => Some("Re-run the export; the item file is malformed."),
            Self::ItemNotFound | Self::RevisionOutOfRange => {
                Some("The revision queue does not match the loaded items; rebuild the plan.")
            }
            Self::DuplicateItem => Some("Each origin id may appear only once in the export."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
