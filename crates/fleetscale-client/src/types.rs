//! Fleet snapshot types.
//!
//! These mirror the shape of `juju status --format=json`: applications keyed
//! by name, each holding its units keyed by unit name (`app/N`), plus a
//! machine table keyed by machine id. Only the fields the reconciler reads
//! are modelled; unknown fields are ignored on decode.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unit name as assigned by the fleet (`app/N`).
pub type UnitId = String;

/// Machine id as assigned by the fleet (`0`, `0/lxd/1`, ...).
pub type MachineId = String;

pub const AGENT_IDLE: &str = "idle";
pub const WORKLOAD_ACTIVE: &str = "active";

// ── Snapshot ────────────────────────────────────────────────────────

/// A full point-in-time read of application and machine status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub applications: HashMap<String, ApplicationStatus>,
    #[serde(default)]
    pub machines: HashMap<MachineId, MachineStatus>,
}

impl FleetSnapshot {
    /// Units of `application`, or `None` if the application is absent.
    pub fn units_of(&self, application: &str) -> Option<&HashMap<UnitId, UnitStatus>> {
        self.applications.get(application).map(|app| &app.units)
    }

    /// Whether `unit` is listed under `application`.
    pub fn contains_unit(&self, application: &str, unit: &str) -> bool {
        self.units_of(application)
            .is_some_and(|units| units.contains_key(unit))
    }

    /// Machine or container by id, searching nested containers
    /// (`0/lxd/1` lives under `machines["0"].containers`).
    pub fn machine(&self, id: &str) -> Option<&MachineStatus> {
        find_machine(&self.machines, id)
    }
}

fn find_machine<'a>(
    machines: &'a HashMap<MachineId, MachineStatus>,
    id: &str,
) -> Option<&'a MachineStatus> {
    machines
        .get(id)
        .or_else(|| machines.values().find_map(|m| find_machine(&m.containers, id)))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStatus {
    #[serde(default)]
    pub units: HashMap<UnitId, UnitStatus>,
}

// ── Unit ────────────────────────────────────────────────────────────

/// Agent and workload health of one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitStatus {
    #[serde(rename = "juju-status", default)]
    pub agent_status: DetailedStatus,
    #[serde(rename = "workload-status", default)]
    pub workload_status: DetailedStatus,
    /// Machine hosting the unit. Empty while the machine is being allocated.
    #[serde(default)]
    pub machine: MachineId,
}

impl UnitStatus {
    pub fn new(agent: &str, workload: &str, machine: &str) -> Self {
        Self {
            agent_status: DetailedStatus::new(agent),
            workload_status: DetailedStatus::new(workload),
            machine: machine.to_string(),
        }
    }

    /// A unit is ready once its agent is idle and its workload active.
    pub fn is_ready(&self) -> bool {
        self.agent_status.current == AGENT_IDLE && self.workload_status.current == WORKLOAD_ACTIVE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedStatus {
    #[serde(default)]
    pub current: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl DetailedStatus {
    pub fn new(current: &str) -> Self {
        Self {
            current: current.to_string(),
            message: String::new(),
        }
    }
}

// ── Machine ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineStatus {
    #[serde(default)]
    pub hostname: String,
    #[serde(rename = "dns-name", default)]
    pub dns_name: String,
    #[serde(rename = "instance-id", default)]
    pub instance_id: String,
    /// Containers hosted on this machine, keyed by container id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub containers: HashMap<MachineId, MachineStatus>,
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddUnitsParams {
    pub application: String,
    pub num_units: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyUnitsParams {
    pub units: Vec<UnitId>,
    pub destroy_storage: bool,
    pub force: bool,
}

/// Per-unit outcome of a removal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyUnitResult {
    pub unit: UnitId,
    /// Set when the fleet rejected the removal of this unit.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_JSON: &str = r#"{
        "model": {"name": "k8s", "type": "iaas"},
        "machines": {
            "0": {"hostname": "juju-a1b2c3-0", "dns-name": "10.0.0.10", "instance-id": "i-0"},
            "1": {"dns-name": "10.0.0.11"},
            "2": {
                "hostname": "juju-a1b2c3-2",
                "containers": {
                    "2/lxd/0": {"hostname": "juju-a1b2c3-2-lxd-0", "dns-name": "10.0.0.20"}
                }
            }
        },
        "applications": {
            "kubernetes-worker": {
                "charm": "kubernetes-worker",
                "units": {
                    "kubernetes-worker/0": {
                        "workload-status": {"current": "active", "message": "Kubernetes worker running."},
                        "juju-status": {"current": "idle", "version": "3.4.2"},
                        "machine": "0",
                        "public-address": "10.0.0.10"
                    },
                    "kubernetes-worker/1": {
                        "workload-status": {"current": "waiting"},
                        "juju-status": {"current": "executing"},
                        "machine": "1"
                    }
                }
            },
            "etcd": {"charm": "etcd"}
        }
    }"#;

    #[test]
    fn decodes_juju_status_json() {
        let snapshot: FleetSnapshot = serde_json::from_str(STATUS_JSON).unwrap();

        let units = snapshot.units_of("kubernetes-worker").unwrap();
        assert_eq!(units.len(), 2);
        assert!(units["kubernetes-worker/0"].is_ready());
        assert!(!units["kubernetes-worker/1"].is_ready());
        assert_eq!(units["kubernetes-worker/0"].machine, "0");

        assert_eq!(snapshot.machine("0").unwrap().hostname, "juju-a1b2c3-0");
        assert_eq!(snapshot.machine("1").unwrap().hostname, "");
        assert_eq!(snapshot.machine("1").unwrap().dns_name, "10.0.0.11");

        let container = snapshot.machine("2/lxd/0").unwrap();
        assert_eq!(container.hostname, "juju-a1b2c3-2-lxd-0");
        assert!(snapshot.machine("2/lxd/9").is_none());

        // Applications without units decode to an empty unit map.
        assert!(snapshot.units_of("etcd").unwrap().is_empty());
        assert!(snapshot.units_of("missing").is_none());
    }

    #[test]
    fn contains_unit_checks_application() {
        let snapshot: FleetSnapshot = serde_json::from_str(STATUS_JSON).unwrap();
        assert!(snapshot.contains_unit("kubernetes-worker", "kubernetes-worker/1"));
        assert!(!snapshot.contains_unit("etcd", "kubernetes-worker/1"));
    }

    #[test]
    fn readiness_requires_idle_and_active() {
        assert!(UnitStatus::new("idle", "active", "0").is_ready());
        assert!(!UnitStatus::new("executing", "active", "0").is_ready());
        assert!(!UnitStatus::new("idle", "blocked", "0").is_ready());
    }
}
