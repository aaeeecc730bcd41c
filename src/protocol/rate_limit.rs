//! Rate limit error extension (`SCYLLA_RATE_LIMIT_ERROR`).
//!
//! When advertised, the server reports per-partition rate limit rejections
//! with a dedicated CQL error code, carried as `ERROR_CODE=<int>`.

use super::options::{parse_int, SupportedOptions, RATE_LIMIT_ERROR};
use super::outcome::FeatureOutcome;
use crate::error::FeatureError;

/// Sub-field carrying the error code
pub const ERROR_CODE: &str = "ERROR_CODE";

/// Decode the rate limit error code.
pub fn parse_rate_limit_error(supported: &SupportedOptions) -> FeatureOutcome<i32> {
    let Some(values) = RATE_LIMIT_ERROR.values(supported) else {
        return FeatureOutcome::Absent;
    };

    let Some(code) = RATE_LIMIT_ERROR.encoded_field(values) else {
        return FeatureOutcome::Rejected(FeatureError::MalformedExtensionField {
            field: ERROR_CODE,
        });
    };

    parse_int::<i32>(code).into()
}
