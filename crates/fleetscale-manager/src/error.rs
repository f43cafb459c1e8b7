//! Manager error types.

use fleetscale_client::FleetError;
use thiserror::Error;

pub type ManagerResult<T> = Result<T, ManagerError>;

#[derive(Debug, Error)]
pub enum ManagerError {
    /// The fleet call failed. Displayed exactly as the client reported it.
    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error("unit with node identity {0} not found")]
    UnitNotFound(String),
}
