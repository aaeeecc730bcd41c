//! CQL protocol extension negotiation.
//!
//! Maps the server's SUPPORTED options to typed [`ProtocolFeatures`] and
//! folds negotiated features back into STARTUP options.
//!
//! # Handshake
//!
//! ```text
//! Client                            Server
//!    |                                |
//!    |-------- OPTIONS ------------->|
//!    |<------- SUPPORTED ------------|  Advertised extensions
//!    |                                |
//!    |   ProtocolFeatures::parse()    |
//!    |   add_startup_options()        |
//!    |                                |
//!    |-------- STARTUP ------------->|  Requested extensions
//!    |<------- READY ----------------|
//! ```
//!
//! Frame encoding, sockets and the behavior behind each feature live in the
//! driver; this module only decodes and re-encodes the option maps.
//!
//! # Extensions
//!
//! | SUPPORTED key                  | Shape                                   | STARTUP entry         |
//! |--------------------------------|-----------------------------------------|-----------------------|
//! | `SCYLLA_RATE_LIMIT_ERROR`      | `ERROR_CODE=<int>`                      | `""`                  |
//! | `SCYLLA_LWT_ADD_METADATA_MARK` | single `LWT_OPTIMIZATION_META_BIT_MASK=<int>` | `"<mask>"`      |
//! | `TABLETS_ROUTING_V1`           | presence only                           | `""`                  |
//! | `SCYLLA_SHARD`, `SCYLLA_NR_SHARDS`, ... | first value                    | (none)                |
//!
//! # Failure Policy
//!
//! | Feature          | Failure                                   | Default       |
//! |------------------|-------------------------------------------|---------------|
//! | Rate limit error | missing or non-numeric `ERROR_CODE`       | fatal         |
//! | Sharding         | non-numeric `SCYLLA_SHARD`                | fatal         |
//! | LWT mark         | not one entry, bad prefix, non-numeric    | recoverable   |
//! | Tablets routing  | (cannot fail)                             | -             |
//!
//! # Usage
//!
//! ```rust
//! use cql_features::protocol::{ProtocolFeatures, StartupOptions, SupportedOptions};
//!
//! let supported = SupportedOptions::new()
//!     .with_option("SCYLLA_LWT_ADD_METADATA_MARK", &["LWT_OPTIMIZATION_META_BIT_MASK=64"])
//!     .with_option("TABLETS_ROUTING_V1", &[]);
//!
//! let features = ProtocolFeatures::parse(&supported).unwrap();
//!
//! let mut startup = StartupOptions::new();
//! startup.insert("CQL_VERSION".to_string(), "3.0.0".to_string());
//! features.add_startup_options(&mut startup);
//!
//! assert_eq!(startup["SCYLLA_LWT_ADD_METADATA_MARK"], "64");
//! assert_eq!(startup["TABLETS_ROUTING_V1"], "");
//! ```

mod features;
mod lwt;
mod options;
mod outcome;
mod rate_limit;
mod sharding;
mod tablets;

pub use features::ProtocolFeatures;
pub use lwt::{parse_lwt_info, LwtInfo, LWT_OPTIMIZATION_META_BIT_MASK};
pub use options::{
    extension_field, OptionShape, StartupOptions, SupportedKey, SupportedOptions,
    LWT_ADD_METADATA_MARK, RATE_LIMIT_ERROR, RECOGNIZED_KEYS, SCYLLA_NR_SHARDS,
    SCYLLA_PARTITIONER, SCYLLA_SHARD, SCYLLA_SHARDING_ALGORITHM, SCYLLA_SHARDING_IGNORE_MSB,
    SCYLLA_SHARD_AWARE_PORT, SCYLLA_SHARD_AWARE_PORT_SSL, TABLETS_ROUTING_V1,
};
pub use outcome::FeatureOutcome;
pub use rate_limit::{parse_rate_limit_error, ERROR_CODE};
pub use sharding::{
    parse_sharding_info, ShardingInfo, BIASED_TOKEN_ROUND_ROBIN, MURMUR3_PARTITIONER,
};
pub use tablets::parse_tablets_info;
