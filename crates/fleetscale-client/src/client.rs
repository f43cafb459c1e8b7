//! The fleet API contract consumed by the reconciler.

use crate::error::FleetResult;
use crate::types::{AddUnitsParams, DestroyUnitResult, DestroyUnitsParams, FleetSnapshot, UnitId};

/// Blocking call/response access to one fleet model.
///
/// Every call is a full round trip. `add_units` and `destroy_units` only
/// report that the request was accepted; their effect shows up in later
/// `status` snapshots.
pub trait FleetClient: Send + Sync {
    /// Read application and machine status, filtered by `patterns`
    /// (an empty slice means everything in the model).
    fn status(&self, patterns: &[String]) -> FleetResult<FleetSnapshot>;

    /// Request additional units. The returned names are advisory.
    fn add_units(&self, args: &AddUnitsParams) -> FleetResult<Vec<UnitId>>;

    /// Request removal of units.
    fn destroy_units(&self, args: &DestroyUnitsParams) -> FleetResult<Vec<DestroyUnitResult>>;
}
