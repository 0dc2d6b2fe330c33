use alloy_primitives::Address;
use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// The all-zero address, used as the default for empty `address` arguments.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Derives the Ethereum address of an uncompressed secp256k1 public key
/// (65 bytes, starting with 0x04).
///
/// The derivation takes the Keccak-256 hash of the 64-byte public key (without
/// the 0x04 prefix) and uses the last 20 bytes as the address.
pub fn pubkey_to_address(uncompressed_pubkey: &[u8]) -> Result<Address, EthError> {
    if uncompressed_pubkey.len() != 65 || uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "expected a 65-byte uncompressed key starting with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Address controlled by the given verifying key.
pub fn verifying_key_to_address(key: &VerifyingKey) -> Address {
    let uncompressed = key.to_encoded_point(false);
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Parses an address string into its 20 raw bytes.
///
/// Accepts `0x`/`0X` followed by 40 hex characters. All-lowercase and
/// all-uppercase inputs carry no checksum; a mixed-case input must match its
/// EIP-55 checksum exactly.
pub fn parse_address(address: &str) -> Result<Address, EthError> {
    let hex_part = strip_hex_prefix(address)?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(hex_part, &mut bytes)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
    let parsed = Address::from(bytes);

    if is_mixed_case(hex_part) && to_checksum(&parsed)[2..] != *hex_part {
        return Err(EthError::InvalidAddress("bad EIP-55 checksum".into()));
    }

    Ok(parsed)
}

/// Validates an Ethereum address string.
///
/// Returns `Ok(false)` for a well-formed address whose mixed-case checksum is
/// wrong, and an error when the input is not an address at all.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    match parse_address(address) {
        Ok(_) => Ok(true),
        Err(EthError::InvalidAddress(msg)) if msg.contains("checksum") => Ok(false),
        Err(e) => Err(e),
    }
}

/// Applies EIP-55 mixed-case checksum encoding to an address string.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let hex_part = strip_hex_prefix(address)?.to_lowercase();
    let lowered = format!("0x{hex_part}");
    parse_address(&lowered).map(|a| to_checksum(&a))
}

/// EIP-55 representation of raw address bytes.
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_slice());
    let hash = Keccak256::digest(lower.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}

fn strip_hex_prefix(address: &str) -> Result<&str, EthError> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))
}

fn is_mixed_case(hex_part: &str) -> bool {
    hex_part.chars().any(|c| c.is_ascii_uppercase()) && hex_part.chars().any(|c| c.is_ascii_lowercase())
}
