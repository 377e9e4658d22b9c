pub mod plan;
pub mod replay;
