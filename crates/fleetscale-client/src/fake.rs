//! Scripted in-memory fleet for tests.
//!
//! Responses are queued per call kind and consumed in order. A call with no
//! queued response fails with a transport error.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::FleetClient;
use crate::error::{FleetError, FleetResult};
use crate::types::{AddUnitsParams, DestroyUnitResult, DestroyUnitsParams, FleetSnapshot, UnitId};

/// A call observed by [`FakeFleet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetCall {
    Status(Vec<String>),
    AddUnits(AddUnitsParams),
    DestroyUnits(DestroyUnitsParams),
}

#[derive(Default)]
struct Script {
    status: VecDeque<FleetResult<FleetSnapshot>>,
    add_units: VecDeque<FleetResult<Vec<UnitId>>>,
    destroy_units: VecDeque<FleetResult<Vec<DestroyUnitResult>>>,
    calls: Vec<FleetCall>,
}

#[derive(Default)]
pub struct FakeFleet {
    script: Mutex<Script>,
}

impl FakeFleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, snapshot: FleetSnapshot) -> &Self {
        self.lock().status.push_back(Ok(snapshot));
        self
    }

    pub fn push_status_error(&self, message: &str) -> &Self {
        self.lock()
            .status
            .push_back(Err(FleetError::Transport(message.to_string())));
        self
    }

    pub fn push_add_units(&self, units: &[&str]) -> &Self {
        self.lock()
            .add_units
            .push_back(Ok(units.iter().map(|u| u.to_string()).collect()));
        self
    }

    pub fn push_add_units_error(&self, message: &str) -> &Self {
        self.lock()
            .add_units
            .push_back(Err(FleetError::Transport(message.to_string())));
        self
    }

    pub fn push_destroy_units(&self, results: Vec<DestroyUnitResult>) -> &Self {
        self.lock().destroy_units.push_back(Ok(results));
        self
    }

    pub fn push_destroy_units_error(&self, message: &str) -> &Self {
        self.lock()
            .destroy_units
            .push_back(Err(FleetError::Transport(message.to_string())));
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<FleetCall> {
        self.lock().calls.clone()
    }

    /// Whether every queued response has been consumed.
    pub fn is_exhausted(&self) -> bool {
        let script = self.lock();
        script.status.is_empty() && script.add_units.is_empty() && script.destroy_units.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn unscripted(call: &str) -> FleetError {
    FleetError::Transport(format!("no scripted response for {call}"))
}

impl FleetClient for FakeFleet {
    fn status(&self, patterns: &[String]) -> FleetResult<FleetSnapshot> {
        let mut script = self.lock();
        script.calls.push(FleetCall::Status(patterns.to_vec()));
        script.status.pop_front().unwrap_or_else(|| Err(unscripted("status")))
    }

    fn add_units(&self, args: &AddUnitsParams) -> FleetResult<Vec<UnitId>> {
        let mut script = self.lock();
        script.calls.push(FleetCall::AddUnits(args.clone()));
        script
            .add_units
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("add_units")))
    }

    fn destroy_units(&self, args: &DestroyUnitsParams) -> FleetResult<Vec<DestroyUnitResult>> {
        let mut script = self.lock();
        script.calls.push(FleetCall::DestroyUnits(args.clone()));
        script
            .destroy_units
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("destroy_units")))
    }
}
