//! Loading a source-tracker export into a [`MigrationContext`].
//!
//! The export is a JSON array of items, each with its revision snapshots in
//! history order:
//!
//! ```json
//! [{ "origin_id": "PROJ-2", "type": "Story", "parent": "PROJ-1",
//!    "revisions": [{ "time": "2024-01-01T00:00:00Z",
//!                    "fields": { "parent": "PROJ-1" } }] }]
//! ```
//!
//! Revision indexes come from array position.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::context::{ContextError, MigrationContext};
use super::item::WorkItem;
use super::revision::FieldValue;
use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("malformed export: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ExportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::ExportParseError,
            Self::Context(e) => e.code(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExportedItem {
    origin_id: String,
    #[serde(rename = "type", default)]
    wi_type: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    wi_id: Option<i64>,
    #[serde(default)]
    revisions: Vec<ExportedRevision>,
}

#[derive(Debug, Deserialize)]
struct ExportedRevision {
    time: DateTime<Utc>,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

/// Parse export JSON text.
///
/// # Errors
///
/// Returns [`ExportError::Parse`] on malformed JSON and
/// [`ExportError::Context`] when an origin id appears twice.
pub fn parse_export(json: &str) -> Result<MigrationContext, ExportError> {
    let exported: Vec<ExportedItem> = serde_json::from_str(json)?;
    let mut ctx = MigrationContext::new();

    for raw in exported {
        let mut item = WorkItem::new(raw.origin_id, raw.wi_type);
        if let Some(parent) = raw.parent.filter(|p| !p.trim().is_empty()) {
            item = item.with_parent(parent);
        }
        for revision in raw.revisions {
            item.push_revision(revision.time, revision.fields);
        }
        let origin_id = item.origin_id().clone();
        ctx.insert(item)?;
        if let Some(wi_id) = raw.wi_id {
            ctx.assign_wi_id(origin_id.as_str(), wi_id)?;
        }
    }

    tracing::debug!(items = ctx.len(), "parsed export");
    Ok(ctx)
}

/// Read and parse an export file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_export(path: &Path) -> Result<MigrationContext> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read export {}", path.display()))?;
    parse_export(&raw).with_context(|| format!("failed to load export {}", path.display()))
}
