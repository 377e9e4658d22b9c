pub mod execution;
pub mod order;
pub mod reference;

pub use execution::{ExecutionItem, ExecutionPlan, PlanError};
pub use order::order_revisions;
pub use reference::RevisionReference;
