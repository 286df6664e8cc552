//! Structured metadata attached to log records.
//!
//! A record's final metadata is layered from three sources. From least to most
//! specific they are: the metadata provider, the handler's own metadata, and the
//! metadata passed with the individual log call. On a key collision the more
//! specific source always wins:
//!
//! ```text
//! provider  {"env": "prod", "build": "42"}
//! handler   {"env": "test"}
//! call      {"env": "override"}
//! ──────────────────────────────────────────
//! merged    {"env": "override", "build": "42"}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Key/value metadata. Keys are unique; ordering is only used for stable output.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A metadata value: a string, a list of values, or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Array(Vec<MetadataValue>),
    Map(Metadata),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert an arbitrary JSON value, stringifying scalars.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => MetadataValue::String(s),
            serde_json::Value::Array(items) => {
                MetadataValue::Array(items.into_iter().map(MetadataValue::from_json).collect())
            }
            serde_json::Value::Object(map) => MetadataValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, MetadataValue::from_json(v)))
                    .collect(),
            ),
            other => MetadataValue::String(other.to_string()),
        }
    }

    /// Convert an arbitrary TOML value, stringifying scalars.
    pub fn from_toml(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => MetadataValue::String(s),
            toml::Value::Array(items) => {
                MetadataValue::Array(items.into_iter().map(MetadataValue::from_toml).collect())
            }
            toml::Value::Table(table) => MetadataValue::Map(metadata_from_toml(table)),
            other => MetadataValue::String(other.to_string()),
        }
    }
}

/// Convert a TOML table into metadata.
pub fn metadata_from_toml(table: toml::Table) -> Metadata {
    table
        .into_iter()
        .map(|(k, v)| (k, MetadataValue::from_toml(v)))
        .collect()
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => f.write_str(s),
            MetadataValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            MetadataValue::Map(map) => {
                f.write_str("[")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(map: Metadata) -> Self {
        MetadataValue::Map(map)
    }
}

impl<T: Into<MetadataValue>> From<Vec<T>> for MetadataValue {
    fn from(items: Vec<T>) -> Self {
        MetadataValue::Array(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! stringified_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for MetadataValue {
                fn from(v: $ty) -> Self {
                    MetadataValue::String(v.to_string())
                }
            }
        )*
    };
}

stringified_from!(bool, i32, i64, u32, u64, usize, f64);

/// Build a [`Metadata`] map from `key => value` pairs.
///
/// ```
/// use debugtools_core::metadata;
///
/// let meta = metadata! { "request_id" => "abc", "attempt" => 2u32 };
/// assert_eq!(meta.len(), 2);
/// ```
#[macro_export]
macro_rules! metadata {
    () => {
        $crate::Metadata::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Metadata::new();
        $(
            map.insert(::std::string::String::from($key), $crate::MetadataValue::from($value));
        )+
        map
    }};
}

/// Merge the three metadata sources for a single log call.
///
/// Starts from the call's metadata, then fills in keys from the handler's
/// metadata that are not yet present, then keys from the provider's output that
/// are still missing. Values from a more specific source are never overwritten.
pub fn merge_metadata(call: Option<Metadata>, handler: &Metadata, provided: Metadata) -> Metadata {
    let mut merged = call.unwrap_or_default();

    for (key, value) in handler {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in provided {
        merged.entry(key).or_insert(value);
    }

    merged
}

/// Parse a `key=value` pair as used on the command line.
pub fn parse_pair(pair: &str) -> Result<(String, MetadataValue), LogError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| LogError::InvalidMetadata(pair.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(LogError::InvalidMetadata(pair.to_string()));
    }

    Ok((key.to_string(), MetadataValue::from(value.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_call_wins_over_handler_and_provider() {
        let handler = metadata! { "env" => "test" };
        let provided = metadata! { "env" => "prod", "build" => "42" };
        let call = metadata! { "env" => "override" };

        let merged = merge_metadata(Some(call), &handler, provided);

        assert_eq!(merged, metadata! { "env" => "override", "build" => "42" });
    }

    #[test]
    fn test_merge_handler_wins_over_provider() {
        let handler = metadata! { "env" => "test" };
        let provided = metadata! { "env" => "prod" };

        let merged = merge_metadata(None, &handler, provided);

        assert_eq!(merged.get("env").and_then(|v| v.as_str()), Some("test"));
    }

    #[test]
    fn test_merge_with_all_sources_empty() {
        let merged = merge_metadata(None, &Metadata::new(), Metadata::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn test_display_nested_values() {
        let value = MetadataValue::from(metadata! {
            "tags" => vec!["a", "b"],
            "user" => "ada",
        });
        assert_eq!(value.to_string(), "[tags: [a, b], user: ada]");
    }

    #[test]
    fn test_from_json_stringifies_scalars() {
        let value = MetadataValue::from_json(serde_json::json!({
            "count": 3,
            "ok": true,
            "names": ["x"]
        }));

        let expected = MetadataValue::Map(metadata! {
            "count" => "3",
            "ok" => "true",
            "names" => vec!["x"],
        });
        assert_eq!(value, expected);
    }

    #[test]
    fn test_untagged_serde_shape() {
        let meta = metadata! { "a" => "1", "b" => vec!["x", "y"] };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"a":"1","b":["x","y"]}"#);

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_parse_pair() {
        let (k, v) = parse_pair("request_id = abc=1").unwrap();
        assert_eq!(k, "request_id");
        assert_eq!(v, MetadataValue::from("abc=1"));

        assert!(parse_pair("no-separator").is_err());
        assert!(parse_pair("=value").is_err());
    }
}
