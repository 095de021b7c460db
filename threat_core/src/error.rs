//! Error types for the threat engine's fallible edges.

use thiserror::Error;

/// Failure loading or validating a [`ThreatConfig`](crate::ThreatConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read threat config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse threat config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid threat config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
