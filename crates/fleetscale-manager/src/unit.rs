//! Tracked units and their lifecycle phase.

use fleetscale_client::UnitStatus;
use serde::Serialize;

/// Lifecycle phase of a tracked unit.
///
/// `Creating -> Running -> Deleting`, with `Creating -> Deleting` allowed.
/// A `Deleting` unit never moves back; it is dropped from the manager on the
/// next reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitPhase {
    Creating,
    Running,
    Deleting,
}

impl UnitPhase {
    /// Initial phase for a unit observed with `status`.
    pub fn observed(status: &UnitStatus) -> Self {
        if status.is_ready() {
            UnitPhase::Running
        } else {
            UnitPhase::Creating
        }
    }
}

/// One fleet unit mapped to at most one cluster node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub(crate) external_id: String,
    pub(crate) node_identity: String,
    pub(crate) phase: UnitPhase,
    pub(crate) last_status: UnitStatus,
}

impl Unit {
    pub(crate) fn new(external_id: &str, phase: UnitPhase, status: UnitStatus) -> Self {
        Self {
            external_id: external_id.to_string(),
            node_identity: String::new(),
            phase,
            last_status: status,
        }
    }

    pub(crate) fn with_identity(mut self, identity: Option<String>) -> Self {
        self.node_identity = identity.unwrap_or_default();
        self
    }

    /// Unit name assigned by the fleet.
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Node hostname or address. Empty until resolved.
    pub fn node_identity(&self) -> &str {
        &self.node_identity
    }

    pub fn phase(&self) -> UnitPhase {
        self.phase
    }

    pub fn last_status(&self) -> &UnitStatus {
        &self.last_status
    }

    pub fn is_resolved(&self) -> bool {
        !self.node_identity.is_empty()
    }

    /// Record a fresh observation. Only `Creating` units are promoted;
    /// `Deleting` is sticky.
    pub(crate) fn observe(&mut self, status: UnitStatus) {
        if self.phase == UnitPhase::Creating && status.is_ready() {
            self.phase = UnitPhase::Running;
        }
        self.last_status = status;
    }
}
