//! Negotiated protocol features.
//!
//! [`ProtocolFeatures`] is built once per connection from the server's
//! SUPPORTED options and folded back into the client's STARTUP options.

use serde::Serialize;

use super::lwt::{parse_lwt_info, LwtInfo};
use super::options::{
    StartupOptions, SupportedOptions, LWT_ADD_METADATA_MARK, RATE_LIMIT_ERROR, SCYLLA_SHARD,
    TABLETS_ROUTING_V1,
};
use super::rate_limit::parse_rate_limit_error;
use super::sharding::{parse_sharding_info, ShardingInfo};
use super::tablets::parse_tablets_info;
use crate::config::NegotiationPolicy;
use crate::error::Result;

/// Features negotiated for one connection.
///
/// `shard_id` is only meaningful when `sharding_info` is present and is 0
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolFeatures {
    /// Error code used for rate limit rejections
    pub rate_limit_error: Option<i32>,
    /// Shard that accepted this connection
    pub shard_id: u32,
    /// Sharding descriptor
    pub sharding_info: Option<ShardingInfo>,
    /// Tablets routing v1 supported
    pub tablets_routing_v1: bool,
    /// LWT metadata mark
    pub lwt_info: Option<LwtInfo>,
}

impl ProtocolFeatures {
    /// Create from already decoded parts
    pub fn new(
        rate_limit_error: Option<i32>,
        sharding: Option<(u32, ShardingInfo)>,
        tablets_routing_v1: bool,
        lwt_info: Option<LwtInfo>,
    ) -> Self {
        let (shard_id, sharding_info) = match sharding {
            Some((shard_id, info)) => (shard_id, Some(info)),
            None => (0, None),
        };

        Self {
            rate_limit_error,
            shard_id,
            sharding_info,
            tablets_routing_v1,
            lwt_info,
        }
    }

    /// Parse SUPPORTED options with the default policy
    pub fn parse(supported: &SupportedOptions) -> Result<Self> {
        Self::parse_with(supported, &NegotiationPolicy::default())
    }

    /// Parse SUPPORTED options, classifying malformed extensions per `policy`
    pub fn parse_with(supported: &SupportedOptions, policy: &NegotiationPolicy) -> Result<Self> {
        let rate_limit_error = parse_rate_limit_error(supported)
            .resolve(RATE_LIMIT_ERROR.name, policy.rate_limit_error)?;
        let sharding = parse_sharding_info(supported).resolve(SCYLLA_SHARD.name, policy.shard_id)?;
        let tablets_routing_v1 = parse_tablets_info(supported);
        let lwt_info =
            parse_lwt_info(supported).resolve(LWT_ADD_METADATA_MARK.name, policy.lwt_info)?;

        Ok(Self::new(rate_limit_error, sharding, tablets_routing_v1, lwt_info))
    }

    /// Check if the server is shard-aware
    pub fn is_sharded(&self) -> bool {
        self.sharding_info.is_some()
    }

    /// Add the STARTUP entries that request the negotiated features.
    ///
    /// Existing entries for other keys are left untouched.
    pub fn add_startup_options(&self, options: &mut StartupOptions) {
        if self.rate_limit_error.is_some() {
            options.insert(RATE_LIMIT_ERROR.name.to_string(), String::new());
        }
        if self.tablets_routing_v1 {
            options.insert(TABLETS_ROUTING_V1.name.to_string(), String::new());
        }
        if let Some(lwt_info) = &self.lwt_info {
            options.insert(
                LWT_ADD_METADATA_MARK.name.to_string(),
                lwt_info.lwt_meta_bit_mask.to_string(),
            );
        }
    }

    /// STARTUP entries for the negotiated features alone
    pub fn startup_options(&self) -> StartupOptions {
        let mut options = StartupOptions::new();
        self.add_startup_options(&mut options);
        options
    }
}
