//! Manager: tracks the units of one application and reconciles them
//! against fleet status.
//!
//! The manager is a polling reconciler. Every operation reads one or more
//! full snapshots through the [`FleetClient`] and updates the in-memory unit
//! map synchronously. There is no retry inside the manager: a failed call
//! leaves the map as it was and the next scheduled cycle tries again.
//!
//! # Reconcile pass
//!
//! ```text
//! snapshot = status(application)
//! for unit in snapshot:
//!     tracked          -> record status, resolve identity, Creating -> Running
//!     untracked, ready -> adopt as Running (added outside the manager)
//!     untracked        -> ignore this cycle
//! for unit tracked but not in snapshot:
//!     -> Deleting (removed outside the manager)
//! drop every Deleting unit
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fleetscale_client::{AddUnitsParams, DestroyUnitsParams, FleetClient, FleetSnapshot, UnitId};
use tracing::{debug, info, warn};

use crate::error::{ManagerError, ManagerResult};
use crate::resolver::NodeResolver;
use crate::unit::{Unit, UnitPhase};

/// Owns the unit map for one `model:application` pair.
///
/// Not internally synchronized: callers run one operation at a time.
pub struct Manager {
    client: Arc<dyn FleetClient>,
    resolver: Arc<dyn NodeResolver>,
    model: String,
    application: String,
    /// Tracked units keyed by external id.
    units: HashMap<UnitId, Unit>,
    /// Units dropped while the fleet still listed them. They are not adopted
    /// again until they disappear from status.
    retired: HashSet<UnitId>,
}

impl Manager {
    /// Build the unit map from one status snapshot.
    ///
    /// Ready units (agent `idle`, workload `active`) start as `Running`,
    /// everything else as `Creating`.
    pub fn init(
        client: Arc<dyn FleetClient>,
        resolver: Arc<dyn NodeResolver>,
        model: &str,
        application: &str,
    ) -> ManagerResult<Self> {
        let mut manager = Self {
            client,
            resolver,
            model: model.to_string(),
            application: application.to_string(),
            units: HashMap::new(),
            retired: HashSet::new(),
        };

        let snapshot = manager.fetch()?;
        let empty = HashMap::new();
        let observed = snapshot.units_of(&manager.application).unwrap_or(&empty);

        for (id, status) in observed {
            let identity = manager.resolver.resolve(status, &snapshot);
            let unit = Unit::new(id, UnitPhase::observed(status), status.clone()).with_identity(identity);
            manager.units.insert(id.clone(), unit);
        }

        info!(
            model = %manager.model,
            application = %manager.application,
            units = manager.units.len(),
            "manager initialized"
        );
        Ok(manager)
    }

    /// Request `delta` more units and track the ones that appear.
    ///
    /// New units are found by diffing the snapshots taken before and after
    /// the request; the names returned by `add_units` are not used. Units
    /// that do not show up yet are not retried here.
    pub fn scale_up(&mut self, delta: u32) -> ManagerResult<()> {
        if delta == 0 {
            debug!(application = %self.application, "scale up by zero units, nothing to do");
            return Ok(());
        }

        let before = self.fetch()?;

        let reported = self.client.add_units(&AddUnitsParams {
            application: self.application.clone(),
            num_units: delta,
        })?;
        debug!(application = %self.application, ?reported, "add units accepted");

        let after = self.fetch()?;

        let empty = HashMap::new();
        let previous = before.units_of(&self.application).unwrap_or(&empty);
        let current = after.units_of(&self.application).unwrap_or(&empty);

        let mut detected = 0;
        for (id, status) in current {
            if previous.contains_key(id) || self.units.contains_key(id) {
                continue;
            }
            self.units
                .insert(id.clone(), Unit::new(id, UnitPhase::Creating, status.clone()));
            detected += 1;
            info!(unit = %id, "added unit to managed units");
        }

        if detected < delta {
            warn!(
                application = %self.application,
                requested = delta,
                detected,
                "fewer new units visible than requested"
            );
        }

        Ok(())
    }

    /// Remove the unit backing `node_identity`.
    ///
    /// The unit is marked `Deleting` before the removal request and stays
    /// that way even if the request fails.
    pub fn scale_down(&mut self, node_identity: &str) -> ManagerResult<()> {
        let unit = self
            .units
            .values_mut()
            .find(|u| u.is_resolved() && u.node_identity == node_identity)
            .ok_or_else(|| ManagerError::UnitNotFound(node_identity.to_string()))?;

        unit.phase = UnitPhase::Deleting;
        let external_id = unit.external_id.clone();
        info!(unit = %external_id, node = %node_identity, "unit state changed to deleting");

        let results = self.client.destroy_units(&DestroyUnitsParams {
            units: vec![external_id],
            destroy_storage: false,
            force: false,
        })?;

        for result in results {
            if let Some(error) = result.error {
                warn!(unit = %result.unit, %error, "fleet rejected unit removal");
            }
        }

        Ok(())
    }

    /// Bring the unit map in line with a fresh snapshot.
    ///
    /// All-or-nothing: if the status call fails nothing is modified.
    pub fn reconcile(&mut self) -> ManagerResult<()> {
        let snapshot = self.fetch()?;
        let empty = HashMap::new();
        let observed = snapshot.units_of(&self.application).unwrap_or(&empty);

        self.retired.retain(|id| observed.contains_key(id));

        for (id, status) in observed {
            match self.units.get_mut(id) {
                Some(unit) => {
                    if !unit.is_resolved()
                        && let Some(identity) = self.resolver.resolve(status, &snapshot)
                    {
                        debug!(unit = %id, node = %identity, "resolved node identity");
                        unit.node_identity = identity;
                    }
                    unit.observe(status.clone());
                }
                None if self.retired.contains(id) => {
                    debug!(unit = %id, "unit still listed while being removed");
                }
                None if status.is_ready() => {
                    let identity = self.resolver.resolve(status, &snapshot);
                    let unit = Unit::new(id, UnitPhase::Running, status.clone()).with_identity(identity);
                    self.units.insert(id.clone(), unit);
                    info!(unit = %id, "detected unmanaged unit, added to managed units");
                }
                None => {
                    debug!(unit = %id, "ignoring unmanaged unit that is not ready");
                }
            }
        }

        for unit in self.units.values_mut() {
            if unit.phase != UnitPhase::Deleting && !observed.contains_key(&unit.external_id) {
                info!(unit = %unit.external_id, "detected managed unit that has been removed");
                unit.phase = UnitPhase::Deleting;
            }
        }

        self.units.retain(|id, unit| {
            if unit.phase != UnitPhase::Deleting {
                return true;
            }
            if observed.contains_key(id) {
                self.retired.insert(id.clone());
            }
            info!(unit = %id, "removed unit from managed units");
            false
        });

        Ok(())
    }

    /// Number of tracked units, whatever their phase.
    pub fn size(&self) -> usize {
        self.units.len()
    }

    /// Find the unit registered under `node_identity`.
    ///
    /// Linear scan. An empty identity never matches.
    pub fn lookup(&self, node_identity: &str) -> Option<&Unit> {
        if node_identity.is_empty() {
            return None;
        }
        self.units.values().find(|u| u.node_identity == node_identity)
    }

    /// Tracked unit by external id.
    pub fn unit(&self, external_id: &str) -> Option<&Unit> {
        self.units.get(external_id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    fn fetch(&self) -> ManagerResult<FleetSnapshot> {
        Ok(self.client.status(std::slice::from_ref(&self.application))?)
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("model", &self.model)
            .field("application", &self.application)
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}
