use thiserror::Error;

/// User-facing command failure. The binary renders the message and exits
/// with a nonzero status; nothing else inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Generic failure for response payloads whose top-level shape cannot
    /// be interpreted at all.
    pub fn could_not_process_response() -> Self {
        Self::new("Could not process response.")
    }
}
