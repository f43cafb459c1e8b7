//! Fleet client error types.

use thiserror::Error;

/// Result type alias for fleet client calls.
pub type FleetResult<T> = Result<T, FleetError>;

/// Errors raised by a [`FleetClient`](crate::FleetClient) call.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("command `{command}` failed (exit code {code:?}): {stderr}")]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to decode status output: {0}")]
    Decode(String),
}
