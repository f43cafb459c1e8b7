//! Configuration error types.

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("invalid node group spec {spec:?}: {reason}")]
    InvalidNodeGroup { spec: String, reason: String },

    #[error("duplicate node group: {0}")]
    DuplicateNodeGroup(String),
}
