//! fleetscale-provider: node groups on top of fleet managers.
//!
//! Each configured `<min>:<max>:<model>:<application>` spec becomes a
//! [`NodeGroup`] owning one [`Manager`](fleetscale_manager::Manager). The
//! [`FleetProvider`] holds all groups and refreshes them; a
//! [`ProviderHandle`] gives async callers serialized access and drives the
//! periodic refresh loop.
//!
//! # Architecture
//!
//! ```text
//! ProviderHandle (Arc<Mutex<..>>, spawn_blocking + timeout)
//!   └── FleetProvider
//!         ├── NodeGroup juju-<model>-<app>  (min, max, target)
//!         │     └── Manager ── FleetClient (juju CLI)
//!         └── ...
//! ```

pub mod error;
pub mod handle;
pub mod node_group;
pub mod provider;

pub use error::{ProviderError, ProviderResult};
pub use handle::ProviderHandle;
pub use node_group::{Instance, NodeGroup, NodeGroupSummary};
pub use provider::{FleetProvider, PROVIDER_NAME};
