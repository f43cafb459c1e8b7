//! Node group specs of the form `<min>:<max>:<model>:<application>`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Bounds and location of one scalable application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeGroupSpec {
    pub min_size: usize,
    pub max_size: usize,
    /// Juju model name or UUID.
    pub model: String,
    /// Application whose units back the group.
    pub application: String,
}

impl NodeGroupSpec {
    /// Stable group identifier, `juju-<model>-<application>`.
    pub fn id(&self) -> String {
        format!("juju-{}-{}", self.model, self.application)
    }
}

impl FromStr for NodeGroupSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidNodeGroup {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.trim().split(':').collect();
        let [min, max, model, application] = parts.as_slice() else {
            return Err(invalid("expected <min>:<max>:<model>:<application>"));
        };

        let min_size = min
            .parse::<usize>()
            .map_err(|_| invalid("min size is not a non-negative integer"))?;
        let max_size = max
            .parse::<usize>()
            .map_err(|_| invalid("max size is not a non-negative integer"))?;

        if max_size == 0 {
            return Err(invalid("max size must be at least 1"));
        }
        if min_size > max_size {
            return Err(invalid("min size is greater than max size"));
        }
        if model.is_empty() || application.is_empty() {
            return Err(invalid("model and application must not be empty"));
        }

        Ok(Self {
            min_size,
            max_size,
            model: model.to_string(),
            application: application.to_string(),
        })
    }
}

impl fmt::Display for NodeGroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.min_size, self.max_size, self.model, self.application
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_spec() {
        let spec: NodeGroupSpec = "1:10:k8s:kubernetes-worker".parse().unwrap();
        assert_eq!(spec.min_size, 1);
        assert_eq!(spec.max_size, 10);
        assert_eq!(spec.model, "k8s");
        assert_eq!(spec.application, "kubernetes-worker");
        assert_eq!(spec.id(), "juju-k8s-kubernetes-worker");
        assert_eq!(spec.to_string(), "1:10:k8s:kubernetes-worker");
    }

    #[test]
    fn allows_scale_to_zero() {
        let spec: NodeGroupSpec = "0:3:m:app".parse().unwrap();
        assert_eq!(spec.min_size, 0);
    }

    #[test]
    fn rejects_missing_application() {
        let err = "1:10:k8s".parse::<NodeGroupSpec>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNodeGroup { .. }));
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!("5:2:m:app".parse::<NodeGroupSpec>().is_err());
        assert!("0:0:m:app".parse::<NodeGroupSpec>().is_err());
        assert!("x:2:m:app".parse::<NodeGroupSpec>().is_err());
        assert!("1:2::app".parse::<NodeGroupSpec>().is_err());
    }
}
