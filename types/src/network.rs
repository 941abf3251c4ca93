//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which ledger network the client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    #[serde(alias = "ckb")]
    Mainnet,
    /// The public test network.
    #[serde(alias = "ckt")]
    Testnet,
}

impl NetworkId {
    /// Human-readable part used in addresses on this network.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Self::Mainnet => "ckb",
            Self::Testnet => "ckt",
        }
    }

    /// Network for an address prefix, if known.
    pub fn from_address_prefix(hrp: &str) -> Option<Self> {
        match hrp {
            "ckb" => Some(Self::Mainnet),
            "ckt" => Some(Self::Testnet),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}
