//! Tablets routing (`TABLETS_ROUTING_V1`).

use super::options::{SupportedOptions, TABLETS_ROUTING_V1};

/// Check if the server supports tablets routing v1.
///
/// Presence of the key is the whole signal; its value list is ignored.
pub fn parse_tablets_info(supported: &SupportedOptions) -> bool {
    TABLETS_ROUTING_V1.is_advertised(supported)
}
