//! Ledger addresses.
//!
//! Full-format address: `hrp` + `1` + bech32m(payload), where
//! `payload = 0x00 || code_hash (32) || hash_type (1) || args`.
//!
//! `hrp` is `ckb` on mainnet and `ckt` on testnet. Bech32m alphabet:
//! `qpzry9x8gf2tvdw0s3jn54khce6mua7l`. Unlike generic bech32 there is no
//! 90-character limit, since lock args can be long.

use daovote_types::{Byte32, NetworkId, Script, ScriptHashType};
use thiserror::Error;

/// Bech32 alphabet (32 chars).
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const CHARSET_REV: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[CHARSET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

const BECH32M_CONST: u32 = 0x2bc8_30a3;
const CHECKSUM_LEN: usize = 6;
/// Payload tag of the full address format.
const FULL_FORMAT: u8 = 0x00;
/// Tag byte + code hash + hash type.
const MIN_PAYLOAD_LEN: usize = 1 + 32 + 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing separator")]
    MissingSeparator,

    #[error("unknown network prefix: {0}")]
    UnknownPrefix(String),

    #[error("invalid character {0:?}")]
    InvalidChar(char),

    #[error("mixed-case address")]
    MixedCase,

    #[error("checksum mismatch")]
    BadChecksum,

    #[error("invalid padding")]
    BadPadding,

    #[error("unsupported address format 0x{0:02x}")]
    UnsupportedFormat(u8),

    #[error("payload too short: {0} bytes")]
    ShortPayload(usize),

    #[error("unknown hash type byte {0}")]
    UnknownHashType(u8),
}

fn polymod(values: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ v as u32;
        for (i, g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 0x1f));
    out
}

/// Regroup 8-bit bytes into 5-bit values, zero-padding the tail.
fn to_base32(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for &byte in bytes {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((buffer >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        out.push(((buffer << (5 - bits)) & 0x1f) as u8);
    }
    out
}

/// Regroup 5-bit values into bytes. Leftover bits must be fewer than 5 and zero.
fn from_base32(values: &[u8]) -> Result<Vec<u8>, AddressError> {
    let mut out = Vec::with_capacity(values.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for &v in values {
        buffer = (buffer << 5) | v as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    if bits >= 5 || (buffer & ((1 << bits) - 1)) != 0 {
        return Err(AddressError::BadPadding);
    }
    Ok(out)
}

/// Encode a lock script as a full-format address for `network`.
pub fn encode_address(script: &Script, network: NetworkId) -> String {
    let hrp = network.address_prefix();

    let mut payload = Vec::with_capacity(MIN_PAYLOAD_LEN + script.args.len());
    payload.push(FULL_FORMAT);
    payload.extend_from_slice(script.code_hash.as_bytes());
    payload.push(script.hash_type.as_byte());
    payload.extend_from_slice(&script.args);

    let data = to_base32(&payload);
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let pm = polymod(&values) ^ BECH32M_CONST;

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    for v in data {
        out.push(CHARSET[v as usize] as char);
    }
    for i in 0..CHECKSUM_LEN {
        let v = (pm >> (5 * (5 - i))) & 0x1f;
        out.push(CHARSET[v as usize] as char);
    }
    out
}

/// Decode a full-format address into its network and lock script.
pub fn decode_address(address: &str) -> Result<(NetworkId, Script), AddressError> {
    let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = address.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::MixedCase);
    }
    let address = address.to_ascii_lowercase();

    let sep = address.rfind('1').ok_or(AddressError::MissingSeparator)?;
    let (hrp, rest) = (&address[..sep], &address[sep + 1..]);
    let network =
        NetworkId::from_address_prefix(hrp).ok_or_else(|| AddressError::UnknownPrefix(hrp.into()))?;
    if rest.len() < CHECKSUM_LEN {
        return Err(AddressError::BadChecksum);
    }

    let mut values = Vec::with_capacity(rest.len());
    for c in rest.chars() {
        let idx = c as usize;
        let v = if idx < 128 { CHARSET_REV[idx] } else { 0xFF };
        if v == 0xFF {
            return Err(AddressError::InvalidChar(c));
        }
        values.push(v);
    }

    let mut check = hrp_expand(hrp);
    check.extend_from_slice(&values);
    if polymod(&check) != BECH32M_CONST {
        return Err(AddressError::BadChecksum);
    }

    let payload = from_base32(&values[..values.len() - CHECKSUM_LEN])?;
    if payload.is_empty() {
        return Err(AddressError::ShortPayload(0));
    }
    if payload[0] != FULL_FORMAT {
        return Err(AddressError::UnsupportedFormat(payload[0]));
    }
    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(AddressError::ShortPayload(payload.len()));
    }

    let mut code_hash = [0u8; 32];
    code_hash.copy_from_slice(&payload[1..33]);
    let hash_type =
        ScriptHashType::from_byte(payload[33]).ok_or(AddressError::UnknownHashType(payload[33]))?;
    let args = payload[MIN_PAYLOAD_LEN..].to_vec();

    Ok((network, Script::new(Byte32::new(code_hash), hash_type, args)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock(args: Vec<u8>) -> Script {
        Script::new(Byte32::new([0x9b; 32]), ScriptHashType::Type, args)
    }

    #[test]
    fn encode_and_decode() {
        let script = lock(vec![0x36; 20]);
        let addr = encode_address(&script, NetworkId::Testnet);
        assert!(addr.starts_with("ckt1"));
        let (network, decoded) = decode_address(&addr).unwrap();
        assert_eq!(network, NetworkId::Testnet);
        assert_eq!(decoded, script);
    }

    #[test]
    fn mainnet_prefix() {
        let addr = encode_address(&lock(vec![1; 20]), NetworkId::Mainnet);
        assert!(addr.starts_with("ckb1"));
    }

    #[test]
    fn long_args_have_no_length_limit() {
        let script = lock(vec![7; 200]);
        let addr = encode_address(&script, NetworkId::Mainnet);
        assert!(addr.len() > 90);
        assert_eq!(decode_address(&addr).unwrap().1, script);
    }

    #[test]
    fn corrupted_character_fails_checksum() {
        let addr = encode_address(&lock(vec![2; 20]), NetworkId::Testnet);
        let mut chars: Vec<char> = addr.chars().collect();
        let i = chars.len() - 10;
        chars[i] = if chars[i] == 'q' { 'p' } else { 'q' };
        let bad: String = chars.into_iter().collect();
        assert_eq!(decode_address(&bad), Err(AddressError::BadChecksum));
    }

    #[test]
    fn uppercase_accepted_mixed_rejected() {
        let addr = encode_address(&lock(vec![3; 20]), NetworkId::Testnet);
        assert!(decode_address(&addr.to_ascii_uppercase()).is_ok());
        let mut mixed = addr.clone();
        mixed.replace_range(0..1, "C");
        assert_eq!(decode_address(&mixed), Err(AddressError::MixedCase));
    }

    #[test]
    fn unknown_prefix_rejected() {
        let addr = encode_address(&lock(vec![3; 20]), NetworkId::Testnet);
        let other = addr.replacen("ckt", "btc", 1);
        assert_eq!(
            decode_address(&other),
            Err(AddressError::UnknownPrefix("btc".into()))
        );
    }

    #[test]
    fn base32_regrouping_round_trip() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x42];
        assert_eq!(from_base32(&to_base32(&data)).unwrap(), data);
    }
}
