//! Lock and type scripts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;
use crate::hash::Byte32;

/// How a script's `code_hash` is matched against cell deps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptHashType {
    /// Match the data hash of a dep cell (first VM version).
    Data,
    /// Match the type script hash of a dep cell.
    Type,
    Data1,
    Data2,
}

impl ScriptHashType {
    /// The byte used in the binary script layout.
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Data => 0,
            Self::Type => 1,
            Self::Data1 => 2,
            Self::Data2 => 4,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Data),
            1 => Some(Self::Type),
            2 => Some(Self::Data1),
            4 => Some(Self::Data2),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptHashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Data => "data",
            Self::Type => "type",
            Self::Data1 => "data1",
            Self::Data2 => "data2",
        };
        f.write_str(s)
    }
}

impl FromStr for ScriptHashType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(Self::Data),
            "type" => Ok(Self::Type),
            "data1" => Ok(Self::Data1),
            "data2" => Ok(Self::Data2),
            other => Err(TypesError::UnknownHashType(other.to_string())),
        }
    }
}

/// A lock or type script: which code runs and with which arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    pub code_hash: Byte32,
    pub hash_type: ScriptHashType,
    #[serde(with = "crate::hex_serde")]
    pub args: Vec<u8>,
}

impl Script {
    pub fn new(code_hash: Byte32, hash_type: ScriptHashType, args: Vec<u8>) -> Self {
        Self {
            code_hash,
            hash_type,
            args,
        }
    }

    /// Bytes this script occupies in a cell: code hash, hash type, args.
    pub fn occupied_bytes(&self) -> usize {
        32 + 1 + self.args.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_type_bytes() {
        for ht in [
            ScriptHashType::Data,
            ScriptHashType::Type,
            ScriptHashType::Data1,
            ScriptHashType::Data2,
        ] {
            assert_eq!(ScriptHashType::from_byte(ht.as_byte()), Some(ht));
            assert_eq!(ht.to_string().parse::<ScriptHashType>().unwrap(), ht);
        }
        assert_eq!(ScriptHashType::from_byte(3), None);
    }

    #[test]
    fn occupied_bytes_counts_args() {
        let s = Script::new(Byte32::ZERO, ScriptHashType::Type, vec![0; 20]);
        assert_eq!(s.occupied_bytes(), 53);
    }

    #[test]
    fn script_json_shape() {
        let s = Script::new(Byte32::ZERO, ScriptHashType::Type, vec![0xaa, 0xbb]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["hash_type"], "type");
        assert_eq!(json["args"], "0xaabb");
    }
}
