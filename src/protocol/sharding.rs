//! Shard-per-core sharding descriptor (`SCYLLA_SHARD` and friends).
//!
//! A shard-aware server reports which shard accepted the connection and how
//! tokens map to shards. The descriptor keeps the raw strings as advertised
//! and parses individual fields on demand; token-to-shard computation is left
//! to the routing layer.

use serde::Serialize;

use super::options::{
    parse_int, SupportedKey, SupportedOptions, SCYLLA_NR_SHARDS, SCYLLA_PARTITIONER, SCYLLA_SHARD,
    SCYLLA_SHARDING_ALGORITHM, SCYLLA_SHARDING_IGNORE_MSB, SCYLLA_SHARD_AWARE_PORT,
    SCYLLA_SHARD_AWARE_PORT_SSL,
};
use super::outcome::FeatureOutcome;

/// Partitioner that implies sharding support
pub const MURMUR3_PARTITIONER: &str = "org.apache.cassandra.dht.Murmur3Partitioner";

/// Sharding algorithm that implies sharding support
pub const BIASED_TOKEN_ROUND_ROBIN: &str = "biased-token-round-robin";

/// Sharding descriptor as advertised by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShardingInfo {
    /// `SCYLLA_SHARD`
    pub shard_id: Option<String>,
    /// `SCYLLA_NR_SHARDS`
    pub shards_count: Option<String>,
    /// `SCYLLA_PARTITIONER`
    pub partitioner: Option<String>,
    /// `SCYLLA_SHARDING_ALGORITHM`
    pub sharding_algorithm: Option<String>,
    /// `SCYLLA_SHARDING_IGNORE_MSB`
    pub sharding_ignore_msb: Option<String>,
    /// `SCYLLA_SHARD_AWARE_PORT`
    pub shard_aware_port: Option<String>,
    /// `SCYLLA_SHARD_AWARE_PORT_SSL`
    pub shard_aware_port_ssl: Option<String>,
}

impl ShardingInfo {
    /// Collect the raw sharding fields from SUPPORTED options
    pub fn from_supported(supported: &SupportedOptions) -> Self {
        let field = |key: SupportedKey| {
            key.first_value_in(supported).map(ToString::to_string)
        };

        Self {
            shard_id: field(SCYLLA_SHARD),
            shards_count: field(SCYLLA_NR_SHARDS),
            partitioner: field(SCYLLA_PARTITIONER),
            sharding_algorithm: field(SCYLLA_SHARDING_ALGORITHM),
            sharding_ignore_msb: field(SCYLLA_SHARDING_IGNORE_MSB),
            shard_aware_port: field(SCYLLA_SHARD_AWARE_PORT),
            shard_aware_port_ssl: field(SCYLLA_SHARD_AWARE_PORT_SSL),
        }
    }

    /// Check if any field signals a shard-aware server
    pub fn is_sharded(&self) -> bool {
        self.shard_id.is_some()
            || self.shards_count.is_some()
            || self.is_murmur3()
            || self.is_biased_token_round_robin()
            || self.sharding_ignore_msb.is_some()
    }

    /// Check if the partitioner is Murmur3
    pub fn is_murmur3(&self) -> bool {
        self.partitioner.as_deref() == Some(MURMUR3_PARTITIONER)
    }

    /// Check if the sharding algorithm is biased token round robin
    pub fn is_biased_token_round_robin(&self) -> bool {
        self.sharding_algorithm.as_deref() == Some(BIASED_TOKEN_ROUND_ROBIN)
    }

    /// Number of shards, if advertised and numeric
    pub fn shards_count(&self) -> Option<u32> {
        parse_field(self.shards_count.as_deref())
    }

    /// Ignored most significant bits, if advertised and numeric
    pub fn sharding_ignore_msb(&self) -> Option<u8> {
        parse_field(self.sharding_ignore_msb.as_deref())
    }

    /// Shard-aware port, if advertised and numeric
    pub fn shard_aware_port(&self) -> Option<u16> {
        parse_field(self.shard_aware_port.as_deref())
    }

    /// TLS shard-aware port, if advertised and numeric
    pub fn shard_aware_port_ssl(&self) -> Option<u16> {
        parse_field(self.shard_aware_port_ssl.as_deref())
    }
}

fn parse_field<T>(raw: Option<&str>) -> Option<T>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    parse_int(raw?).ok()
}

/// Decode the sharding descriptor and the connection's shard id.
///
/// If sharding is signaled by another field while `SCYLLA_SHARD` itself is
/// missing, the shard id is 0.
pub fn parse_sharding_info(supported: &SupportedOptions) -> FeatureOutcome<(u32, ShardingInfo)> {
    let info = ShardingInfo::from_supported(supported);
    tracing::debug!(?info, "Parsing sharding info from SUPPORTED options");

    if !info.is_sharded() {
        return FeatureOutcome::Absent;
    }

    let shard_id = match info.shard_id.as_deref() {
        Some(raw) => match parse_int::<u32>(raw) {
            Ok(id) => id,
            Err(e) => return FeatureOutcome::Rejected(e),
        },
        None => {
            tracing::debug!("Sharding advertised without SCYLLA_SHARD, assuming shard 0");
            0
        },
    };

    FeatureOutcome::Present((shard_id, info))
}
