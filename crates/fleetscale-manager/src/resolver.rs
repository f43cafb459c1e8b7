//! Node identity resolution.
//!
//! Maps a unit to the hostname or address its cluster node registers with.
//! Resolution goes through the machine table of the same snapshot, so a unit
//! whose machine is still being provisioned yields `None` and is retried on
//! the next reconcile.

use fleetscale_client::{FleetSnapshot, UnitStatus};
use fleetscale_core::IdentitySource;

pub trait NodeResolver: Send + Sync {
    /// Node identity for `unit`, or `None` when not yet determinable.
    fn resolve(&self, unit: &UnitStatus, snapshot: &FleetSnapshot) -> Option<String>;
}

impl NodeResolver for IdentitySource {
    fn resolve(&self, unit: &UnitStatus, snapshot: &FleetSnapshot) -> Option<String> {
        if unit.machine.is_empty() {
            return None;
        }
        let machine = snapshot.machine(&unit.machine)?;
        let value = match self {
            IdentitySource::Hostname => &machine.hostname,
            IdentitySource::DnsName => &machine.dns_name,
        };
        (!value.is_empty()).then(|| value.clone())
    }
}
