//! Hex helpers for binary fields exchanged as JSON.
//!
//! Use with `#[serde(with = "daovote_types::hex_serde")]` on `Vec<u8>` fields.

use serde::{Deserialize, Deserializer, Serializer};

use crate::error::TypesError;

/// Encode bytes as a `0x`-prefixed lowercase hex string.
pub fn encode_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string, accepting an optional `0x` prefix.
pub fn decode_prefixed(s: &str) -> Result<Vec<u8>, TypesError> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(raw).map_err(|e| TypesError::InvalidHex(e.to_string()))
}

pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode_prefixed(bytes))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    decode_prefixed(&s).map_err(serde::de::Error::custom)
}

/// Same as the parent module, for `Option<Vec<u8>>` fields.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&super::encode_prefixed(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| super::decode_prefixed(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_optional() {
        assert_eq!(decode_prefixed("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_prefixed("dead").unwrap(), vec![0xde, 0xad]);
    }

    #[test]
    fn empty_string_is_empty_bytes() {
        assert!(decode_prefixed("0x").unwrap().is_empty());
        assert_eq!(encode_prefixed(&[]), "0x");
    }

    #[test]
    fn odd_length_rejected() {
        assert!(matches!(
            decode_prefixed("0xabc"),
            Err(TypesError::InvalidHex(_))
        ));
    }
}
