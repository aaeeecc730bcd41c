//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//!
//! Each source yields a [`PolicyOverrides`] layer. Layers are applied over
//! the defaults with [`NegotiationConfig::merge`]; a field set in a later
//! layer always wins, even when it equals the default.
//!
//! The only knob is the negotiation policy: for every fallible extension,
//! whether a malformed value aborts the handshake or just disables the feature.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NegotiationError, Result};

/// How a malformed extension is treated during negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Abort negotiation with an error naming the extension.
    Fatal,
    /// Log a warning and treat the feature as not advertised.
    Recoverable,
}

impl Severity {
    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Recoverable => "recoverable",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fatal" | "error" => Ok(Self::Fatal),
            "recoverable" | "warn" | "ignore" => Ok(Self::Recoverable),
            _ => Err(format!("Unknown severity: {s}. Use: fatal, recoverable")),
        }
    }
}

/// Per-feature failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationPolicy {
    /// Malformed `SCYLLA_RATE_LIMIT_ERROR` (missing or non-numeric `ERROR_CODE`)
    pub rate_limit_error: Severity,
    /// Non-numeric `SCYLLA_SHARD`
    pub shard_id: Severity,
    /// Malformed `SCYLLA_LWT_ADD_METADATA_MARK`
    pub lwt_info: Severity,
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            rate_limit_error: Severity::Fatal,
            shard_id: Severity::Fatal,
            lwt_info: Severity::Recoverable,
        }
    }
}

impl NegotiationPolicy {
    /// Policy that never aborts the handshake.
    pub fn lenient() -> Self {
        Self {
            rate_limit_error: Severity::Recoverable,
            shard_id: Severity::Recoverable,
            lwt_info: Severity::Recoverable,
        }
    }

    /// Policy that aborts on any malformed extension.
    pub fn strict() -> Self {
        Self {
            rate_limit_error: Severity::Fatal,
            shard_id: Severity::Fatal,
            lwt_info: Severity::Fatal,
        }
    }
}

/// Partially specified policy, one layer of configuration.
///
/// Unset fields defer to the layer below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverrides {
    /// Override for `SCYLLA_RATE_LIMIT_ERROR`
    pub rate_limit_error: Option<Severity>,
    /// Override for `SCYLLA_SHARD`
    pub shard_id: Option<Severity>,
    /// Override for `SCYLLA_LWT_ADD_METADATA_MARK`
    pub lwt_info: Option<Severity>,
}

impl PolicyOverrides {
    /// Read overrides from `CQL_FEATURES_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read overrides through a variable lookup.
    ///
    /// Values that are not a known severity are logged and skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let severity = |var: &str| -> Option<Severity> {
            let raw = lookup(var)?;
            match raw.parse() {
                Ok(severity) => Some(severity),
                Err(e) => {
                    tracing::warn!("Ignoring {var}: {e}");
                    None
                },
            }
        };

        Self {
            rate_limit_error: severity("CQL_FEATURES_RATE_LIMIT_ERROR"),
            shard_id: severity("CQL_FEATURES_SHARD_ID"),
            lwt_info: severity("CQL_FEATURES_LWT_INFO"),
        }
    }

    /// Read the `[policy]` table of a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        #[derive(Deserialize)]
        struct FileLayer {
            #[serde(default)]
            policy: PolicyOverrides,
        }

        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| NegotiationError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str::<FileLayer>(&content)
            .map(|layer| layer.policy)
            .map_err(|e| NegotiationError::Config(format!("Failed to parse config: {e}")))
    }

    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply on top of a complete policy
    pub fn apply(&self, policy: NegotiationPolicy) -> NegotiationPolicy {
        NegotiationPolicy {
            rate_limit_error: self.rate_limit_error.unwrap_or(policy.rate_limit_error),
            shard_id: self.shard_id.unwrap_or(policy.shard_id),
            lwt_info: self.lwt_info.unwrap_or(policy.lwt_info),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationConfig {
    /// Failure classification per extension
    #[serde(default)]
    pub policy: NegotiationPolicy,
}

impl NegotiationConfig {
    /// Load configuration from a TOML file on top of the defaults
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::default().merge(PolicyOverrides::from_file(path)?))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Self {
        Self::default().merge(PolicyOverrides::from_env())
    }

    /// Resolve all layers, lowest precedence first: defaults, environment,
    /// then the config file if one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::from_env();
        match path {
            Some(path) => Ok(config.merge(PolicyOverrides::from_file(path)?)),
            None => Ok(config),
        }
    }

    /// Merge an override layer; every field it sets wins
    pub fn merge(self, overrides: PolicyOverrides) -> Self {
        Self {
            policy: overrides.apply(self.policy),
        }
    }
}
