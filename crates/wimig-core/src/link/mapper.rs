//! Single-valued relationship reconciliation.
//!
//! The target tracker only understands explicit link additions and removals,
//! so link state is re-derived from field snapshots one revision at a time.
//! Every function here appends zero or more [`WiLink`] mutations to a
//! caller-owned list and fails only on a broken rule (blank field name or
//! link type), which is checked before the revision is looked at.
//!
//! # Parent field normalization
//!
//! Newer source schemas merged the epic-link and parent-link fields into a
//! single `parent` field that stores a bare numeric id instead of an item
//! key. When `parent` holds an integer and the owning item has a resolved
//! parent key, that key is used instead. See [`normalize_link_value`].

use crate::config::LinkMap;
use crate::model::item::numeric_suffix;
use crate::model::{FieldValue, ReferenceChangeType, RevisionRef, WiLink};

use super::LinkError;

/// Canonical name of the unified parent field.
pub const PARENT_FIELD: &str = "parent";

fn check_rule(field: &str, link_type: &str) -> Result<(), LinkError> {
    if field.trim().is_empty() {
        return Err(LinkError::BlankField);
    }
    if link_type.trim().is_empty() {
        return Err(LinkError::BlankLinkType {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Resolve a raw field value to the key of the item it links to.
///
/// Only values that parse as a 32-bit integer count as numeric ids; wider
/// numbers pass through unchanged. Returns `None` when the value is absent,
/// null or blank.
#[must_use]
pub fn normalize_link_value(
    revision: RevisionRef<'_>,
    field: &str,
    value: Option<&FieldValue>,
) -> Option<String> {
    let key = value?.as_link_key()?;
    if field == PARENT_FIELD && key.trim().parse::<i32>().is_ok() {
        if let Some(parent) = revision.item().parent() {
            return Some(parent.to_string());
        }
    }
    Some(key)
}

/// Add a parent/child link only from the higher-numbered side of the pair.
///
/// A pair of items may carry both a forward epic-link field and a backward
/// child-link field for the same relationship. The link is emitted only when
/// the numeric suffix of this item's key is greater than the suffix of the
/// referenced key, so the pair is linked once. Keys without an integer
/// suffix emit nothing.
///
/// # Errors
///
/// Returns [`LinkError`] if `field` or `link_type` is blank.
pub fn map_epic_child_link(
    revision: RevisionRef<'_>,
    links: &mut Vec<WiLink>,
    field: &str,
    link_type: &str,
    config: &LinkMap,
) -> Result<(), LinkError> {
    check_rule(field, link_type)?;

    let Some(value) = revision.field(field) else {
        return Ok(());
    };

    let own = revision.origin_id().numeric_suffix();
    let referenced = match value {
        FieldValue::Text(key) => numeric_suffix(key),
        other => other.as_integer(),
    };

    match (own, referenced) {
        (Some(own), Some(referenced)) if own > referenced => {
            add_single_link(revision, links, field, link_type, config)
        }
        _ => {
            tracing::trace!(
                origin_id = %revision.origin_id(),
                field,
                value = %value,
                "directional guard skipped epic/child link"
            );
            Ok(())
        }
    }
}

/// Retract the previous value of a single-valued link field, then add the
/// current one.
///
/// Does nothing unless the revision carries the field (possibly as null).
/// For any revision after the first, the previous value (as of the prior
/// revision) is always retracted when present, even if the current revision
/// restates the same value. A current value that is null or blank only
/// retracts.
///
/// # Errors
///
/// Returns [`LinkError`] if `field` or `link_type` is blank.
pub fn add_remove_single_link(
    revision: RevisionRef<'_>,
    links: &mut Vec<WiLink>,
    field: &str,
    link_type: &str,
    config: &LinkMap,
) -> Result<(), LinkError> {
    check_rule(field, link_type)?;

    let Some(value) = revision.field(field) else {
        return Ok(());
    };

    let current = normalize_link_value(revision, field, Some(value));
    let wi_type = config.resolve(link_type).unwrap_or_default();
    if wi_type.is_empty() {
        tracing::debug!(field, link_type, "no link-map entry; emitting untyped links");
    }
    let source = revision.origin_id();

    if revision.index() != 0 {
        let previous = normalize_link_value(revision, field, revision.previous_value(field));
        if let Some(previous) = previous {
            links.push(WiLink {
                change: ReferenceChangeType::Removed,
                source_origin_id: source.clone(),
                target_origin_id: previous,
                wi_type: wi_type.to_string(),
            });
        }
    }

    if let Some(target) = current {
        links.push(WiLink {
            change: ReferenceChangeType::Added,
            source_origin_id: source.clone(),
            target_origin_id: target,
            wi_type: wi_type.to_string(),
        });
    }

    Ok(())
}

/// Add a link for a field whose value never changes once set.
///
/// Never looks at earlier revisions. When the link type has no mapping the
/// link is skipped with a warning.
///
/// # Errors
///
/// Returns [`LinkError`] if `field` or `link_type` is blank.
pub fn add_single_link(
    revision: RevisionRef<'_>,
    links: &mut Vec<WiLink>,
    field: &str,
    link_type: &str,
    config: &LinkMap,
) -> Result<(), LinkError> {
    check_rule(field, link_type)?;

    let Some(target) = revision.field(field).and_then(FieldValue::as_link_key) else {
        return Ok(());
    };

    let Some(wi_type) = config.resolve(link_type).filter(|t| !t.is_empty()) else {
        tracing::warn!(
            source = %revision.origin_id(),
            target = %target,
            link_type,
            "cannot add link: link-map configuration missing"
        );
        return Ok(());
    };

    links.push(WiLink {
        change: ReferenceChangeType::Added,
        source_origin_id: revision.origin_id().clone(),
        target_origin_id: target,
        wi_type: wi_type.to_string(),
    });
    Ok(())
}
