//! SUPPORTED / STARTUP option maps and the recognized extension keys.
//!
//! The server advertises extensions as a string multimap. Each recognized key
//! has one of three shapes:
//!
//! | Shape        | Example                                              |
//! |--------------|------------------------------------------------------|
//! | `Presence`   | `TABLETS_ROUTING_V1: []`                             |
//! | `Encoded`    | `SCYLLA_RATE_LIMIT_ERROR: ["ERROR_CODE=61440"]`      |
//! | `FirstValue` | `SCYLLA_NR_SHARDS: ["8"]`                            |

use std::collections::HashMap;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lwt::LWT_OPTIMIZATION_META_BIT_MASK;
use super::rate_limit::ERROR_CODE;
use crate::error::{FeatureError, Result};

/// Options sent by the client in STARTUP (key → value).
pub type StartupOptions = HashMap<String, String>;

/// How the value list of a SUPPORTED key is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum OptionShape {
    /// Only the presence of the key matters
    Presence,
    /// Value list carries a `FIELD=<value>` entry
    Encoded {
        /// Sub-field name
        field: &'static str,
    },
    /// First element of the value list is the value
    FirstValue,
}

/// A SUPPORTED key this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportedKey {
    /// Key as sent on the wire
    pub name: &'static str,
    /// Value list interpretation
    #[serde(flatten)]
    pub shape: OptionShape,
}

impl SupportedKey {
    const fn presence(name: &'static str) -> Self {
        Self {
            name,
            shape: OptionShape::Presence,
        }
    }

    const fn encoded(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            shape: OptionShape::Encoded { field },
        }
    }

    const fn first_value(name: &'static str) -> Self {
        Self {
            name,
            shape: OptionShape::FirstValue,
        }
    }

    /// Check if the server advertised this key (with any value list)
    pub fn is_advertised(&self, supported: &SupportedOptions) -> bool {
        supported.contains(self.name)
    }

    /// Raw value list for this key
    pub fn values<'a>(&self, supported: &'a SupportedOptions) -> Option<&'a [String]> {
        supported.values(self.name)
    }

    /// First non-empty value for this key
    pub fn first_value_in<'a>(&self, supported: &'a SupportedOptions) -> Option<&'a str> {
        supported.first_value(self.name)
    }

    /// Decode the encoded sub-field from a value list.
    ///
    /// Returns `None` when the key is not `Encoded` or no entry carries the field.
    pub fn encoded_field<'a>(&self, values: &'a [String]) -> Option<&'a str> {
        match self.shape {
            OptionShape::Encoded { field } => extension_field(values, field),
            OptionShape::Presence | OptionShape::FirstValue => None,
        }
    }
}

/// Rate limit error extension, `ERROR_CODE=<int>`
pub const RATE_LIMIT_ERROR: SupportedKey =
    SupportedKey::encoded("SCYLLA_RATE_LIMIT_ERROR", ERROR_CODE);
/// LWT metadata mark, `LWT_OPTIMIZATION_META_BIT_MASK=<int>`
pub const LWT_ADD_METADATA_MARK: SupportedKey =
    SupportedKey::encoded("SCYLLA_LWT_ADD_METADATA_MARK", LWT_OPTIMIZATION_META_BIT_MASK);
/// Tablets routing v1
pub const TABLETS_ROUTING_V1: SupportedKey = SupportedKey::presence("TABLETS_ROUTING_V1");

/// Shard the connection landed on
pub const SCYLLA_SHARD: SupportedKey = SupportedKey::first_value("SCYLLA_SHARD");
/// Number of shards on the node
pub const SCYLLA_NR_SHARDS: SupportedKey = SupportedKey::first_value("SCYLLA_NR_SHARDS");
/// Partitioner class name
pub const SCYLLA_PARTITIONER: SupportedKey = SupportedKey::first_value("SCYLLA_PARTITIONER");
/// Token-to-shard algorithm
pub const SCYLLA_SHARDING_ALGORITHM: SupportedKey =
    SupportedKey::first_value("SCYLLA_SHARDING_ALGORITHM");
/// Most significant token bits ignored by the sharding algorithm
pub const SCYLLA_SHARDING_IGNORE_MSB: SupportedKey =
    SupportedKey::first_value("SCYLLA_SHARDING_IGNORE_MSB");
/// Shard-aware port (plain)
pub const SCYLLA_SHARD_AWARE_PORT: SupportedKey =
    SupportedKey::first_value("SCYLLA_SHARD_AWARE_PORT");
/// Shard-aware port (TLS)
pub const SCYLLA_SHARD_AWARE_PORT_SSL: SupportedKey =
    SupportedKey::first_value("SCYLLA_SHARD_AWARE_PORT_SSL");

/// All keys recognized during negotiation
pub const RECOGNIZED_KEYS: [SupportedKey; 10] = [
    RATE_LIMIT_ERROR,
    LWT_ADD_METADATA_MARK,
    TABLETS_ROUTING_V1,
    SCYLLA_SHARD,
    SCYLLA_NR_SHARDS,
    SCYLLA_PARTITIONER,
    SCYLLA_SHARDING_ALGORITHM,
    SCYLLA_SHARDING_IGNORE_MSB,
    SCYLLA_SHARD_AWARE_PORT,
    SCYLLA_SHARD_AWARE_PORT_SSL,
];

/// Options advertised by the server in SUPPORTED (key → ordered values).
///
/// Keys are case-sensitive and may map to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedOptions(HashMap<String, Vec<String>>);

impl SupportedOptions {
    /// Create an empty option map
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode from a JSON object of string lists, e.g. `{"SCYLLA_SHARD": ["3"]}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add an option (builder style)
    pub fn with_option(mut self, key: &str, values: &[&str]) -> Self {
        self.insert(key, values.iter().map(ToString::to_string).collect());
        self
    }

    /// Insert or replace an option
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.insert(key.into(), values);
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Value list for a key
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// First value for a key; a missing key, empty list or empty string yields `None`
    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.values(key)?
            .first()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all options
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Underlying map
    pub fn into_inner(self) -> HashMap<String, Vec<String>> {
        self.0
    }
}

impl From<HashMap<String, Vec<String>>> for SupportedOptions {
    fn from(options: HashMap<String, Vec<String>>) -> Self {
        Self(options)
    }
}

impl FromIterator<(String, Vec<String>)> for SupportedOptions {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Look up the first `key=<value>` entry and return `<value>`.
///
/// Entries are trimmed before matching. An entry equal to `key` without `=`
/// does not match.
pub fn extension_field<'a, S: AsRef<str>>(values: &'a [S], key: &str) -> Option<&'a str> {
    values.iter().find_map(|v| {
        v.as_ref()
            .trim()
            .strip_prefix(key)?
            .strip_prefix('=')
    })
}

/// Parse an integer, tolerating surrounding whitespace.
pub(crate) fn parse_int<T>(raw: &str) -> std::result::Result<T, FeatureError>
where
    T: FromStr<Err = ParseIntError>,
{
    raw.trim()
        .parse()
        .map_err(|e| FeatureError::unparsable(raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_field_match() {
        assert_eq!(extension_field(&["ERROR_CODE=429"], "ERROR_CODE"), Some("429"));
    }

    #[test]
    fn test_extension_field_other_key() {
        assert_eq!(extension_field(&["FOO=1"], "ERROR_CODE"), None);
    }

    #[test]
    fn test_extension_field_key_without_delimiter() {
        assert_eq!(extension_field(&["ERROR_CODE"], "ERROR_CODE"), None);
        assert_eq!(extension_field(&["  ERROR_CODE  "], "ERROR_CODE"), None);
    }

    #[test]
    fn test_extension_field_longer_key_prefix() {
        // ERROR_CODES=... must not match ERROR_CODE
        assert_eq!(extension_field(&["ERROR_CODES=1"], "ERROR_CODE"), None);
    }

    #[test]
    fn test_extension_field_first_match_wins() {
        let values = ["FOO=1", " ERROR_CODE=7 ", "ERROR_CODE=8"];
        assert_eq!(extension_field(&values, "ERROR_CODE"), Some("7"));
    }

    #[test]
    fn test_extension_field_empty_value_and_extra_delimiter() {
        assert_eq!(extension_field(&["ERROR_CODE="], "ERROR_CODE"), Some(""));
        assert_eq!(extension_field(&["K=a=b"], "K"), Some("a=b"));
    }

    #[test]
    fn test_first_value() {
        let supported = SupportedOptions::new()
            .with_option("A", &["1", "2"])
            .with_option("EMPTY_LIST", &[])
            .with_option("EMPTY_STRING", &[""]);

        assert_eq!(supported.first_value("A"), Some("1"));
        assert_eq!(supported.first_value("EMPTY_LIST"), None);
        assert_eq!(supported.first_value("EMPTY_STRING"), None);
        assert_eq!(supported.first_value("MISSING"), None);
        assert!(supported.contains("EMPTY_LIST"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let supported = SupportedOptions::new().with_option("tablets_routing_v1", &[]);
        assert!(!TABLETS_ROUTING_V1.is_advertised(&supported));
    }

    #[test]
    fn test_encoded_field_only_for_encoded_shape() {
        let values = vec!["ERROR_CODE=1".to_string()];
        assert_eq!(RATE_LIMIT_ERROR.encoded_field(&values), Some("1"));
        assert_eq!(TABLETS_ROUTING_V1.encoded_field(&values), None);
        assert_eq!(SCYLLA_SHARD.encoded_field(&values), None);
    }

    #[test]
    fn test_supported_options_json() {
        let json = r#"{"SCYLLA_SHARD":["3"],"TABLETS_ROUTING_V1":[]}"#;
        let supported: SupportedOptions = serde_json::from_str(json).unwrap();
        assert_eq!(supported.len(), 2);
        assert_eq!(SCYLLA_SHARD.first_value_in(&supported), Some("3"));
    }

    #[test]
    fn test_from_json_rejects_non_list_values() {
        let err = SupportedOptions::from_json(r#"{"SCYLLA_SHARD": "3"}"#).unwrap_err();
        assert!(matches!(err, crate::error::NegotiationError::Json(_)));
    }

    #[test]
    fn test_parse_int_trims() {
        assert_eq!(parse_int::<i32>(" 42 "), Ok(42));
        assert!(matches!(
            parse_int::<u32>("-1"),
            Err(FeatureError::UnparsableInteger { .. })
        ));
    }
}
