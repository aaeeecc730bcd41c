//! Lightweight transaction metadata mark (`SCYLLA_LWT_ADD_METADATA_MARK`).
//!
//! The server advertises a single `LWT_OPTIMIZATION_META_BIT_MASK=<int>`
//! entry. When the client echoes the mask back in STARTUP, result metadata
//! flags of prepared LWT statements carry those bits.

use serde::Serialize;

use super::options::{parse_int, SupportedOptions, LWT_ADD_METADATA_MARK};
use super::outcome::FeatureOutcome;
use crate::error::FeatureError;

/// Sub-field carrying the bit mask
pub const LWT_OPTIMIZATION_META_BIT_MASK: &str = "LWT_OPTIMIZATION_META_BIT_MASK";

/// Negotiated LWT metadata bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LwtInfo {
    /// Bits set in result metadata flags for LWT statements
    pub lwt_meta_bit_mask: u32,
}

impl LwtInfo {
    /// Create from a bit mask
    pub fn new(lwt_meta_bit_mask: u32) -> Self {
        Self { lwt_meta_bit_mask }
    }

    /// Check if metadata flags mark a statement as LWT
    pub fn is_lwt(&self, flags: u32) -> bool {
        flags & self.lwt_meta_bit_mask == self.lwt_meta_bit_mask
    }
}

/// Decode the LWT metadata mark.
///
/// The value list must hold exactly one `LWT_OPTIMIZATION_META_BIT_MASK=<int>`.
/// The entry is matched with [`extension_field`](super::options::extension_field),
/// so surrounding whitespace is tolerated rather than rejected as a foreign
/// prefix.
pub fn parse_lwt_info(supported: &SupportedOptions) -> FeatureOutcome<LwtInfo> {
    let Some(values) = LWT_ADD_METADATA_MARK.values(supported) else {
        return FeatureOutcome::Absent;
    };

    if values.len() != 1 {
        return FeatureOutcome::Rejected(FeatureError::InvalidValueCardinality {
            expected: 1,
            actual: values.len(),
        });
    }

    let Some(mask) = LWT_ADD_METADATA_MARK.encoded_field(values) else {
        return FeatureOutcome::Rejected(FeatureError::MalformedExtensionField {
            field: LWT_OPTIMIZATION_META_BIT_MASK,
        });
    };

    FeatureOutcome::from(parse_int::<u32>(mask)).map(LwtInfo::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lwt(values: &[&str]) -> SupportedOptions {
        SupportedOptions::new().with_option("SCYLLA_LWT_ADD_METADATA_MARK", values)
    }

    #[test]
    fn test_bit_mask() {
        assert_eq!(
            parse_lwt_info(&lwt(&["LWT_OPTIMIZATION_META_BIT_MASK=64"])),
            FeatureOutcome::Present(LwtInfo::new(64))
        );
    }

    #[test]
    fn test_high_bit_mask() {
        // Scylla uses 0x80000000
        assert_eq!(
            parse_lwt_info(&lwt(&["LWT_OPTIMIZATION_META_BIT_MASK=2147483648"])).present(),
            Some(LwtInfo::new(0x8000_0000))
        );
    }

    #[test]
    fn test_not_advertised() {
        assert_eq!(parse_lwt_info(&SupportedOptions::new()), FeatureOutcome::Absent);
    }

    #[test]
    fn test_two_entries() {
        let outcome = parse_lwt_info(&lwt(&[
            "LWT_OPTIMIZATION_META_BIT_MASK=64",
            "LWT_OPTIMIZATION_META_BIT_MASK=32",
        ]));
        assert_eq!(
            outcome.error(),
            Some(&FeatureError::InvalidValueCardinality {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_empty_list() {
        assert!(matches!(
            parse_lwt_info(&lwt(&[])),
            FeatureOutcome::Rejected(FeatureError::InvalidValueCardinality { actual: 0, .. })
        ));
    }

    #[test]
    fn test_garbage() {
        assert!(matches!(
            parse_lwt_info(&lwt(&["GARBAGE"])),
            FeatureOutcome::Rejected(FeatureError::MalformedExtensionField { .. })
        ));
    }

    #[test]
    fn test_non_numeric_mask() {
        assert!(matches!(
            parse_lwt_info(&lwt(&["LWT_OPTIMIZATION_META_BIT_MASK=x"])),
            FeatureOutcome::Rejected(FeatureError::UnparsableInteger { .. })
        ));
    }

    #[test]
    fn test_padded_entry() {
        assert_eq!(
            parse_lwt_info(&lwt(&[" LWT_OPTIMIZATION_META_BIT_MASK=64 "])).present(),
            Some(LwtInfo::new(64))
        );
        assert!(matches!(
            parse_lwt_info(&lwt(&["X_LWT_OPTIMIZATION_META_BIT_MASK=64"])),
            FeatureOutcome::Rejected(FeatureError::MalformedExtensionField { .. })
        ));
    }

    #[test]
    fn test_is_lwt() {
        let info = LwtInfo::new(0b0100_0000);
        assert!(info.is_lwt(0b0100_0001));
        assert!(!info.is_lwt(0b0000_0001));
    }
}
