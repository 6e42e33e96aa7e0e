//! Serde helpers for integers that travel as decimal strings in amino JSON

use serde::{de, Deserialize, Deserializer, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// LCD responses are inconsistent about quoting integers; accept both forms.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

/// Serialize an integer as a decimal string, deserialize from a string or a number.
///
/// ```ignore
/// #[serde(with = "crate::serde_helpers::decimal_string")]
/// pub sequence: u64,
/// ```
pub mod decimal_string {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + From<u64>,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.trim().parse().map_err(de::Error::custom),
            StringOrNumber::Number(n) => Ok(T::from(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Wrapper {
        #[serde(with = "super::decimal_string")]
        value: u128,
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Wrapper { value: 42 }).unwrap();
        assert_eq!(json, r#"{"value":"42"}"#);
    }

    #[test]
    fn test_deserializes_string_or_number() {
        let quoted: Wrapper = serde_json::from_str(r#"{"value":"17"}"#).unwrap();
        let bare: Wrapper = serde_json::from_str(r#"{"value":17}"#).unwrap();
        assert_eq!(quoted, bare);
        assert!(serde_json::from_str::<Wrapper>(r#"{"value":"1.5"}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"value":"-1"}"#).is_err());
    }
}
