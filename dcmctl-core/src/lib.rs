//! Leaf types shared across the dcmctl workspace.

mod error;
mod fqn;
mod sanitize;

pub use error::CliError;
pub use fqn::{FqnError, QualifiedName};
pub use sanitize::sanitize_for_terminal;
