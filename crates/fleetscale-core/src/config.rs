//! fleetscale.toml configuration parser.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::spec::NodeGroupSpec;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub juju: JujuConfig,
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub node_groups: Vec<NodeGroupEntry>,
}

/// How the `juju` CLI is invoked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JujuConfig {
    /// Path to the juju binary. Defaults to `juju` on `$PATH`.
    pub binary: Option<PathBuf>,
    /// Controller name, prefixed to every model as `controller:model`.
    pub controller: Option<String>,
    /// Exported as `JUJU_DATA` for every invocation.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout: String,
    #[serde(default)]
    pub node_identity: IdentitySource,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            operation_timeout: default_operation_timeout(),
            node_identity: IdentitySource::default(),
        }
    }
}

fn default_refresh_interval() -> String {
    "10s".to_string()
}

fn default_operation_timeout() -> String {
    "2m".to_string()
}

/// Which machine field correlates a unit with a cluster node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentitySource {
    #[default]
    Hostname,
    DnsName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroupEntry {
    /// `<min>:<max>:<model>:<application>`
    pub spec: String,
}

impl FleetConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: FleetConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check durations and node group specs without touching the network.
    /// Both durations must be non-zero.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.refresh_interval()?.is_zero() {
            return Err(ConfigError::ZeroDuration("refresh_interval"));
        }
        if self.operation_timeout()?.is_zero() {
            return Err(ConfigError::ZeroDuration("operation_timeout"));
        }
        self.node_group_specs(&[])?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> ConfigResult<Duration> {
        parse_duration(&self.manager.refresh_interval)
    }

    pub fn operation_timeout(&self) -> ConfigResult<Duration> {
        parse_duration(&self.manager.operation_timeout)
    }

    /// Parse every configured group plus `extra` specs given on the command
    /// line. Group ids must be unique.
    pub fn node_group_specs(&self, extra: &[String]) -> ConfigResult<Vec<NodeGroupSpec>> {
        let mut seen = HashSet::new();
        let mut specs = Vec::new();

        for raw in self.node_groups.iter().map(|e| e.spec.as_str()).chain(extra.iter().map(String::as_str)) {
            let spec: NodeGroupSpec = raw.parse()?;
            if !seen.insert(spec.id()) {
                return Err(ConfigError::DuplicateNodeGroup(spec.id()));
            }
            specs.push(spec);
        }

        Ok(specs)
    }
}

/// Parse a duration string like "30s", "5m", "500ms" or bare seconds.
pub fn parse_duration(s: &str) -> ConfigResult<Duration> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().map(Duration::from_millis).map_err(|_| invalid())
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().map(Duration::from_secs).map_err(|_| invalid())
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
            .ok_or_else(invalid)
    } else {
        s.parse::<u64>().map(Duration::from_secs).map_err(|_| invalid())
    }
}
