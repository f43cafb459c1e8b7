//! Provider error types.

use std::time::Duration;

use fleetscale_manager::ManagerError;
use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error("failed to initialize node group {group}: {source}")]
    Init {
        group: String,
        #[source]
        source: ManagerError,
    },

    #[error("node group not found: {0}")]
    NodeGroupNotFound(String),

    #[error("delta must be positive, have: {0}")]
    InvalidDelta(usize),

    #[error("size increase is too large. current: {current} desired: {desired} max: {max}")]
    SizeIncreaseTooLarge {
        current: usize,
        desired: usize,
        max: usize,
    },

    #[error("size decrease is too large. current: {current} desired: {desired} min: {min}")]
    SizeDecreaseTooLarge {
        current: usize,
        desired: usize,
        min: usize,
    },

    #[error("attempt to delete existing nodes. target: {current} desired: {desired} registered: {registered}")]
    WouldDeleteRegisteredNodes {
        current: usize,
        desired: usize,
        registered: usize,
    },

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider task failed: {0}")]
    Task(String),
}
