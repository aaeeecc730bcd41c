//! Negotiation error types.
//!
//! # Fatal vs Recoverable
//!
//! Every extension parser reports its failures as a [`FeatureError`]. Whether
//! that failure aborts the handshake or merely disables the feature is not
//! decided by the parser but by the [`Severity`](crate::config::Severity)
//! configured for that feature:
//!
//! - **Fatal**: wrapped into [`NegotiationError::Extension`], naming the
//!   SUPPORTED key that failed to parse
//! - **Recoverable**: logged via `tracing` and the feature is treated as absent
//!
//! Tablets routing is presence-only and never produces an error.

use std::num::ParseIntError;

use thiserror::Error;

/// Failure while decoding a single extension from SUPPORTED options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    /// Expected `FIELD=<value>` sub-field is missing or carries another prefix.
    #[error("Missing or malformed extension field {field}")]
    MalformedExtensionField {
        /// Sub-field name (e.g. `ERROR_CODE`).
        field: &'static str,
    },

    /// Value list has the wrong number of entries.
    #[error("Expected {expected} value(s), got {actual}")]
    InvalidValueCardinality {
        /// Required list length.
        expected: usize,
        /// Actual list length.
        actual: usize,
    },

    /// Value is not a valid integer.
    #[error("Unparsable integer {value:?}: {source}")]
    UnparsableInteger {
        /// Raw text that failed to parse.
        value: String,
        /// Underlying parse error.
        #[source]
        source: ParseIntError,
    },
}

impl FeatureError {
    /// Build an [`FeatureError::UnparsableInteger`] from raw text.
    pub(crate) fn unparsable(value: &str, source: ParseIntError) -> Self {
        FeatureError::UnparsableInteger {
            value: value.to_string(),
            source,
        }
    }
}

/// Protocol feature negotiation errors.
#[derive(Error, Debug)]
pub enum NegotiationError {
    /// A fatal extension failed to parse; the handshake must be aborted.
    #[error("Failed to parse extension {extension}: {source}")]
    Extension {
        /// SUPPORTED key of the failing extension.
        extension: &'static str,
        /// What went wrong.
        #[source]
        source: FeatureError,
    },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NegotiationError {
    /// SUPPORTED key of the failing extension, if this is an extension failure.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            NegotiationError::Extension { extension, .. } => Some(*extension),
            _ => None,
        }
    }
}

/// Result type alias for negotiation operations
pub type Result<T> = std::result::Result<T, NegotiationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_error_names_key() {
        let source = "abc".parse::<i32>().unwrap_err();
        let err = NegotiationError::Extension {
            extension: "SCYLLA_RATE_LIMIT_ERROR",
            source: FeatureError::unparsable("abc", source),
        };

        let msg = err.to_string();
        assert!(msg.contains("SCYLLA_RATE_LIMIT_ERROR"));
        assert!(msg.contains("\"abc\""));
        assert_eq!(err.extension(), Some("SCYLLA_RATE_LIMIT_ERROR"));
    }

    #[test]
    fn test_source_chain_preserved() {
        use std::error::Error as _;

        let err = NegotiationError::Extension {
            extension: "SCYLLA_SHARD",
            source: FeatureError::unparsable("x", "x".parse::<u32>().unwrap_err()),
        };

        let feature = err.source().unwrap();
        assert!(feature.source().is_some());
    }

    #[test]
    fn test_config_error_has_no_extension() {
        let err = NegotiationError::Config("bad".to_string());
        assert_eq!(err.extension(), None);
    }
}
