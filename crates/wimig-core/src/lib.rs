//! wimig-core library.
//!
//! Replays source work-item revision histories in one global chronological
//! order and derives the link additions and removals a target tracker needs
//! for single-valued relationship fields (parent, epic).
//!
//! The pieces, leaves first:
//!
//! - [`model`]: work items, revision snapshots and link mutations.
//! - [`plan`]: the ordered revision reference queue and the
//!   [`ExecutionPlan`](plan::ExecutionPlan) that resolves it.
//! - [`link`]: the single-valued link reconcilers.
//! - [`replay`]: a driver that feeds every planned revision through the
//!   configured link rules.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums in the library, each mapped to an
//!   [`ErrorCode`]; `anyhow::Result` at file-loading boundaries.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod link;
pub mod model;
pub mod plan;
pub mod replay;

pub use error::ErrorCode;
