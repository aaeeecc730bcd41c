//! Typed result of parsing one extension.

use crate::config::Severity;
use crate::error::{FeatureError, NegotiationError, Result};

/// Outcome of decoding a single extension from SUPPORTED options.
///
/// Parsers never log or abort on their own; the caller resolves the outcome
/// against the [`Severity`] configured for the feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureOutcome<T> {
    /// Advertised and well-formed
    Present(T),
    /// Not advertised
    Absent,
    /// Advertised but malformed
    Rejected(FeatureError),
}

impl<T> FeatureOutcome<T> {
    /// Check if the feature was decoded
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Decoded value, discarding any error
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent | Self::Rejected(_) => None,
        }
    }

    /// Error, if the extension was malformed
    pub fn error(&self) -> Option<&FeatureError> {
        match self {
            Self::Rejected(e) => Some(e),
            Self::Present(_) | Self::Absent => None,
        }
    }

    /// Map the decoded value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FeatureOutcome<U> {
        match self {
            Self::Present(v) => FeatureOutcome::Present(f(v)),
            Self::Absent => FeatureOutcome::Absent,
            Self::Rejected(e) => FeatureOutcome::Rejected(e),
        }
    }

    /// Apply the failure policy.
    ///
    /// A rejected outcome becomes an error naming `extension` when `severity`
    /// is fatal, and a logged `None` otherwise.
    pub fn resolve(self, extension: &'static str, severity: Severity) -> Result<Option<T>> {
        match self {
            Self::Present(v) => Ok(Some(v)),
            Self::Absent => Ok(None),
            Self::Rejected(source) => match severity {
                Severity::Fatal => Err(NegotiationError::Extension { extension, source }),
                Severity::Recoverable => {
                    tracing::warn!(
                        extension,
                        error = %source,
                        "Ignoring malformed protocol extension"
                    );
                    Ok(None)
                },
            },
        }
    }
}

impl<T> From<std::result::Result<T, FeatureError>> for FeatureOutcome<T> {
    fn from(result: std::result::Result<T, FeatureError>) -> Self {
        match result {
            Ok(v) => Self::Present(v),
            Err(e) => Self::Rejected(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> FeatureOutcome<u32> {
        FeatureOutcome::Rejected(FeatureError::MalformedExtensionField { field: "F" })
    }

    #[test]
    fn test_resolve_present_and_absent() {
        assert_eq!(
            FeatureOutcome::Present(5).resolve("K", Severity::Fatal).unwrap(),
            Some(5)
        );
        assert_eq!(
            FeatureOutcome::<u32>::Absent
                .resolve("K", Severity::Fatal)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_fatal() {
        let err = rejected().resolve("K", Severity::Fatal).unwrap_err();
        assert_eq!(err.extension(), Some("K"));
    }

    #[test]
    fn test_resolve_recoverable() {
        assert_eq!(rejected().resolve("K", Severity::Recoverable).unwrap(), None);
    }

    #[test]
    fn test_map_and_accessors() {
        let outcome = FeatureOutcome::Present(2).map(|v| v * 10);
        assert!(outcome.is_present());
        assert_eq!(outcome.present(), Some(20));

        let r = rejected();
        assert!(r.error().is_some());
        assert!(!r.is_present());
        assert!(r.map(|v| v + 1).error().is_some());
    }
}
