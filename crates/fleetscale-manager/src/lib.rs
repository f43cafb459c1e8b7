//! fleetscale-manager: unit lifecycle tracking for one fleet application.
//!
//! The [`Manager`] keeps an in-memory map of every unit backing a node group
//! and converges it with polled fleet status. It issues scale-up and
//! scale-down requests through a [`FleetClient`](fleetscale_client::FleetClient)
//! and resolves each unit's node identity through a [`NodeResolver`].
//!
//! # Unit lifecycle
//!
//! ```text
//! scale_up ──► Creating ──(idle/active)──► Running
//!                 │                          │
//!                 └──────► Deleting ◄────────┘  scale_down / gone from status
//!                             │
//!                             ▼
//!                       dropped on reconcile
//! ```
//!
//! Units added outside the manager are adopted directly as `Running` the
//! first time they are seen ready.

pub mod error;
pub mod manager;
pub mod resolver;
pub mod unit;

pub use error::{ManagerError, ManagerResult};
pub use manager::Manager;
pub use resolver::NodeResolver;
pub use unit::{Unit, UnitPhase};
