//! Drain an [`ExecutionPlan`] and reconcile links for every revision.
//!
//! Each popped revision is run through every configured [`LinkRule`] in rule
//! order, and the resulting mutations are handed to the caller as one
//! [`ReplayStep`]. Processing is strictly sequential: a revision's links
//! depend on the previous revision of the same item, so nothing here is
//! reordered or parallelized.
//!
//! Planner contract violations and broken rules abort the replay. There is
//! no retry; whatever was already handed out stays handed out.
//!
//! [`LinkRule`]: crate::config::LinkRule

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::MigrationConfig;
use crate::error::ErrorCode;
use crate::link::{LinkError, apply_rule};
use crate::model::{OriginId, ReferenceChangeType, WiLink};
use crate::plan::{ExecutionPlan, PlanError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("revision {rev} of {origin_id}: {source}")]
    Link {
        origin_id: OriginId,
        rev: usize,
        #[source]
        source: LinkError,
    },
}

impl ReplayError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Plan(e) => e.code(),
            Self::Link { source, .. } => source.code(),
        }
    }
}

/// The outcome of replaying one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayStep {
    pub origin_id: OriginId,
    pub wi_id: Option<i64>,
    pub wi_type: String,
    pub rev_index: usize,
    pub time: DateTime<Utc>,
    pub is_final: bool,
    pub links: Vec<WiLink>,
}

/// Aggregate of a full replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub revisions: usize,
    pub items_finalized: usize,
    pub links_added: usize,
    pub links_removed: usize,
    pub steps: Vec<ReplayStep>,
}

impl ReplayReport {
    fn record(&mut self, step: ReplayStep) {
        self.revisions += 1;
        if step.is_final {
            self.items_finalized += 1;
        }
        for link in &step.links {
            match link.change {
                ReferenceChangeType::Added => self.links_added += 1,
                ReferenceChangeType::Removed => self.links_removed += 1,
            }
        }
        self.steps.push(step);
    }

    /// All link mutations in replay order.
    pub fn links(&self) -> impl Iterator<Item = &WiLink> {
        self.steps.iter().flat_map(|step| step.links.iter())
    }
}

/// Replay every remaining revision, calling `on_step` once per revision in
/// queue order. Returns the number of revisions replayed.
///
/// # Errors
///
/// Returns [`ReplayError::Plan`] when the queue references a missing item or
/// revision, and [`ReplayError::Link`] when a rule is blank.
pub fn replay_with<F>(
    plan: &mut ExecutionPlan<'_>,
    config: &MigrationConfig,
    mut on_step: F,
) -> Result<usize, ReplayError>
where
    F: FnMut(ReplayStep),
{
    let mut replayed = 0usize;

    while let Some(exec) = plan.try_pop()? {
        let mut links = Vec::new();
        for rule in &config.link_rules {
            apply_rule(exec.revision, &mut links, rule, &config.link_map).map_err(|source| {
                ReplayError::Link {
                    origin_id: exec.origin_id.clone(),
                    rev: exec.revision.index(),
                    source,
                }
            })?;
        }

        tracing::debug!(
            item = %exec,
            links = links.len(),
            is_final = exec.is_final,
            "replayed revision"
        );

        on_step(ReplayStep {
            origin_id: exec.origin_id.clone(),
            wi_id: exec.wi_id,
            wi_type: exec.wi_type.to_string(),
            rev_index: exec.revision.index(),
            time: exec.revision.time(),
            is_final: exec.is_final,
            links,
        });
        replayed += 1;
    }

    tracing::info!(revisions = replayed, "replay complete");
    Ok(replayed)
}

/// Replay every remaining revision and collect the steps into a report.
///
/// # Errors
///
/// See [`replay_with`].
pub fn replay(
    plan: &mut ExecutionPlan<'_>,
    config: &MigrationConfig,
) -> Result<ReplayReport, ReplayError> {
    let mut report = ReplayReport::default();
    replay_with(plan, config, |step| report.record(step))?;
    Ok(report)
}
