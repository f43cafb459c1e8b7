//! fleetscale-client: access to the fleet behind a node group.
//!
//! Defines the [`FleetClient`] contract (status snapshots, unit addition and
//! removal) and the snapshot types decoded from `juju status`. [`JujuCli`]
//! implements the contract by invoking the `juju` binary.
//!
//! # Components
//!
//! - **`client`**: the `FleetClient` trait
//! - **`types`**: `FleetSnapshot`, `UnitStatus`, `MachineStatus`, request params
//! - **`cli`**: `JujuCli`, a process-backed client
//! - **`fake`**: `FakeFleet`, a scripted client for tests (feature `fake`)

pub mod cli;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod types;

pub use cli::JujuCli;
pub use client::FleetClient;
pub use error::{FleetError, FleetResult};
#[cfg(any(test, feature = "fake"))]
pub use fake::{FakeFleet, FleetCall};
pub use types::*;
