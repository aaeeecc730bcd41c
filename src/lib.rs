//! # CQL Protocol Features
//!
//! Negotiation of optional CQL wire-protocol extensions during connection
//! startup.
//!
//! A CQL server lists the extensions it supports in its SUPPORTED message as a
//! string multimap. This crate turns that map into typed [`ProtocolFeatures`]
//! and turns the features back into the entries a client sends in STARTUP to
//! enable them.
//!
//! ## Supported Extensions
//!
//! | Extension                      | Advertised as                          | Feature                 |
//! |--------------------------------|----------------------------------------|-------------------------|
//! | `SCYLLA_RATE_LIMIT_ERROR`      | `ERROR_CODE=<int>`                     | `rate_limit_error`      |
//! | `SCYLLA_SHARD` & co.           | first value of each key                | `shard_id`, `sharding_info` |
//! | `TABLETS_ROUTING_V1`           | key presence                           | `tablets_routing_v1`    |
//! | `SCYLLA_LWT_ADD_METADATA_MARK` | `LWT_OPTIMIZATION_META_BIT_MASK=<int>` | `lwt_info`              |
//!
//! ## Quick Start
//!
//! ```rust
//! use cql_features::{ProtocolFeatures, SupportedOptions};
//!
//! let supported = SupportedOptions::new()
//!     .with_option("SCYLLA_SHARD", &["3"])
//!     .with_option("SCYLLA_NR_SHARDS", &["8"])
//!     .with_option("SCYLLA_RATE_LIMIT_ERROR", &["ERROR_CODE=61440"]);
//!
//! let features = ProtocolFeatures::parse(&supported).unwrap();
//! assert_eq!(features.shard_id, 3);
//! assert_eq!(features.rate_limit_error, Some(61440));
//!
//! let startup = features.startup_options();
//! assert_eq!(startup["SCYLLA_RATE_LIMIT_ERROR"], "");
//! ```
//!
//! ## Failure Policy
//!
//! Malformed extensions are either fatal (negotiation returns an error naming
//! the extension) or recoverable (a `tracing` warning is emitted and the
//! feature is disabled). The classification is configurable per feature:
//!
//! ```rust
//! use cql_features::{NegotiationPolicy, ProtocolFeatures, SupportedOptions};
//!
//! let supported = SupportedOptions::new()
//!     .with_option("SCYLLA_RATE_LIMIT_ERROR", &["ERROR_CODE=not-a-number"]);
//!
//! assert!(ProtocolFeatures::parse(&supported).is_err());
//!
//! let features = ProtocolFeatures::parse_with(&supported, &NegotiationPolicy::lenient()).unwrap();
//! assert_eq!(features.rate_limit_error, None);
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Option maps, extension parsers and the feature aggregate
//! - [`config`]: Negotiation policy configuration
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod protocol;

// Re-exports for convenience
pub use config::{NegotiationConfig, NegotiationPolicy, PolicyOverrides, Severity};
pub use error::{FeatureError, NegotiationError, Result};
pub use protocol::{
    FeatureOutcome, LwtInfo, ProtocolFeatures, ShardingInfo, StartupOptions, SupportedOptions,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
