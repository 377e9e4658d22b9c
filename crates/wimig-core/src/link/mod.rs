pub mod mapper;

pub use mapper::{
    PARENT_FIELD, add_remove_single_link, add_single_link, map_epic_child_link,
    normalize_link_value,
};

use crate::config::{LinkMap, LinkMapper, LinkRule};
use crate::error::ErrorCode;
use crate::model::{RevisionRef, WiLink};

/// A link rule that can never be reconciled. Fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("link field name must not be blank")]
    BlankField,

    #[error("link type for field {field} must not be blank")]
    BlankLinkType { field: String },
}

impl LinkError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::BlankField => ErrorCode::BlankLinkField,
            Self::BlankLinkType { .. } => ErrorCode::BlankLinkType,
        }
    }
}

/// Run the reconciler selected by `rule.mapper` for one revision.
///
/// # Errors
///
/// Propagates [`LinkError`] from the selected reconciler.
pub fn apply_rule(
    revision: RevisionRef<'_>,
    links: &mut Vec<WiLink>,
    rule: &LinkRule,
    config: &LinkMap,
) -> Result<(), LinkError> {
    let (field, link_type) = (rule.field.as_str(), rule.link_type.as_str());
    match rule.mapper {
        LinkMapper::AddRemove => add_remove_single_link(revision, links, field, link_type, config),
        LinkMapper::Add => add_single_link(revision, links, field, link_type, config),
        LinkMapper::EpicChild => map_epic_child_link(revision, links, field, link_type, config),
    }
}
