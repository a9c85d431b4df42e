//! Operation layer: target-context resolution, statement building, and
//! artifact sync. Commands stay thin; everything testable lives here.

pub mod context;
pub mod project;
pub mod sync;
