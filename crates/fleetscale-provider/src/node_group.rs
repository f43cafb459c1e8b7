//! Node group: min/max bounds and a target size over one manager.
//!
//! Translates the autoscaler's vocabulary (increase size, delete nodes,
//! decrease target) into manager operations. The target only moves when the
//! underlying fleet request was accepted.

use fleetscale_core::NodeGroupSpec;
use fleetscale_manager::{Manager, UnitPhase};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// A unit as reported to the autoscaler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub unit: String,
    /// Node identity, absent until the unit's machine is known.
    pub node: Option<String>,
    pub phase: UnitPhase,
}

/// Serializable view of a node group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeGroupSummary {
    pub id: String,
    pub model: String,
    pub application: String,
    pub min_size: usize,
    pub max_size: usize,
    pub target_size: usize,
    pub size: usize,
}

#[derive(Debug)]
pub struct NodeGroup {
    id: String,
    min_size: usize,
    max_size: usize,
    target: usize,
    manager: Manager,
}

impl NodeGroup {
    /// Wrap an initialized manager. The target starts at the current size.
    pub fn new(spec: &NodeGroupSpec, manager: Manager) -> Self {
        Self {
            id: spec.id(),
            min_size: spec.min_size,
            max_size: spec.max_size,
            target: manager.size(),
            manager,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn target_size(&self) -> usize {
        self.target
    }

    /// Number of tracked units.
    pub fn size(&self) -> usize {
        self.manager.size()
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Add `delta` units, bounded by the group maximum.
    pub fn increase_size(&mut self, delta: usize) -> ProviderResult<()> {
        if delta == 0 {
            return Err(ProviderError::InvalidDelta(delta));
        }

        let (current, max) = (self.target, self.max_size);
        let too_large = |desired| ProviderError::SizeIncreaseTooLarge {
            current,
            desired,
            max,
        };
        let desired = match current.checked_add(delta) {
            Some(desired) if desired <= max => desired,
            desired => return Err(too_large(desired.unwrap_or(usize::MAX))),
        };
        let units = u32::try_from(delta).map_err(|_| too_large(desired))?;

        self.manager.scale_up(units)?;
        self.target = desired;
        info!(group = %self.id, target = self.target, "node group size increased");
        Ok(())
    }

    /// Remove the units backing `nodes`, one at a time.
    ///
    /// Stops at the first failure; nodes handled before it stay removed.
    pub fn delete_nodes(&mut self, nodes: &[String]) -> ProviderResult<()> {
        for node in nodes {
            if self.target == 0 || self.target - 1 < self.min_size {
                return Err(ProviderError::SizeDecreaseTooLarge {
                    current: self.target,
                    desired: self.target.saturating_sub(1),
                    min: self.min_size,
                });
            }

            self.manager.scale_down(node)?;
            self.target -= 1;
            info!(group = %self.id, %node, target = self.target, "node deleted from group");
        }
        Ok(())
    }

    /// Lower the target without removing any node, for requested units that
    /// never registered.
    pub fn decrease_target_size(&mut self, delta: usize) -> ProviderResult<()> {
        if delta == 0 {
            return Err(ProviderError::InvalidDelta(delta));
        }

        let desired = self.target.saturating_sub(delta);
        if self.target < delta || desired < self.min_size {
            return Err(ProviderError::SizeDecreaseTooLarge {
                current: self.target,
                desired,
                min: self.min_size,
            });
        }

        let registered = self.registered_nodes();
        if desired < registered {
            return Err(ProviderError::WouldDeleteRegisteredNodes {
                current: self.target,
                desired,
                registered,
            });
        }

        self.target = desired;
        info!(group = %self.id, target = self.target, "node group target decreased");
        Ok(())
    }

    /// Units with a node identity that are not being removed.
    fn registered_nodes(&self) -> usize {
        self.manager
            .units()
            .filter(|u| u.is_resolved() && u.phase() != UnitPhase::Deleting)
            .count()
    }

    pub fn nodes(&self) -> Vec<Instance> {
        let mut nodes: Vec<Instance> = self
            .manager
            .units()
            .map(|u| Instance {
                unit: u.external_id().to_string(),
                node: u.is_resolved().then(|| u.node_identity().to_string()),
                phase: u.phase(),
            })
            .collect();
        nodes.sort_by(|a, b| a.unit.cmp(&b.unit));
        nodes
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.manager.lookup(node).is_some()
    }

    /// Reconcile with the fleet and adopt its size as the new target.
    pub fn refresh(&mut self) -> ProviderResult<()> {
        self.manager.reconcile()?;
        self.target = self.manager.size();
        debug!(group = %self.id, target = self.target, "node group refreshed");
        Ok(())
    }

    pub fn summary(&self) -> NodeGroupSummary {
        NodeGroupSummary {
            id: self.id.clone(),
            model: self.manager.model().to_string(),
            application: self.manager.application().to_string(),
            min_size: self.min_size,
            max_size: self.max_size,
            target_size: self.target,
            size: self.size(),
        }
    }

    /// One-line description for logs.
    pub fn debug(&self) -> String {
        format!(
            "{} (min: {}, max: {}, target: {}, size: {})",
            self.id,
            self.min_size,
            self.max_size,
            self.target,
            self.size()
        )
    }
}
