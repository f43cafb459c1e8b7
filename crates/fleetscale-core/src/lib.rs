pub mod config;
pub mod error;
pub mod spec;

pub use config::{FleetConfig, IdentitySource, JujuConfig, ManagerConfig, NodeGroupEntry};
pub use error::{ConfigError, ConfigResult};
pub use spec::NodeGroupSpec;
