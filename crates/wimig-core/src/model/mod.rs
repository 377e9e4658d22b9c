pub mod context;
pub mod export;
pub mod item;
pub mod link;
pub mod revision;

pub use context::{ContextError, MigrationContext};
pub use item::{OriginId, WorkItem};
pub use link::{ReferenceChangeType, WiLink};
pub use revision::{FieldValue, Revision, RevisionRef};
