use std::fmt;
use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Length of a secp256k1 private key in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// A `String` wrapper that is zeroed when dropped.
///
/// Use this for sensitive string data (private key hex, mnemonic phrases) that
/// must not linger in memory after use. `Debug` never prints the contents.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ZeroizingString(String);

impl ZeroizingString {
    /// Creates a new `ZeroizingString` from a `String`.
    pub fn new(data: String) -> Self {
        Self(data)
    }

    /// Returns the length of the inner string in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the inner string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for ZeroizingString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ZeroizingString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ZeroizingString(***)")
    }
}

impl From<String> for ZeroizingString {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<&str> for ZeroizingString {
    fn from(data: &str) -> Self {
        Self::new(data.to_owned())
    }
}

/// Raw 32-byte private key material, zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKeyBytes([u8; SECRET_KEY_LEN]);

impl SecretKeyBytes {
    /// Wraps raw key bytes.
    pub fn new(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a private key given as `0x` followed by exactly 64 hex digits.
    ///
    /// The prefix is mandatory and must be lowercase; upper and lower case hex
    /// digits are both accepted.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let digits = input
            .strip_prefix("0x")
            .ok_or_else(|| CryptoError::InvalidInput("private key must start with 0x".into()))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CryptoError::InvalidInput(
                "private key contains non-hex characters".into(),
            ));
        }

        if digits.len() % 2 != 0 {
            return Err(CryptoError::InvalidInput(format!(
                "private key has an odd number of hex digits ({})",
                digits.len()
            )));
        }
        if digits.len() != SECRET_KEY_LEN * 2 {
            return Err(CryptoError::InvalidKeyLength {
                expected: SECRET_KEY_LEN,
                actual: digits.len() / 2,
            });
        }

        let mut bytes = [0u8; SECRET_KEY_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {e}")))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }

    /// Renders the key as `0x`-prefixed lowercase hex in a zeroizing string.
    pub fn to_hex(&self) -> ZeroizingString {
        ZeroizingString::new(format!("0x{}", hex::encode(self.0)))
    }
}

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKeyBytes(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn zeroizing_string_deref() {
        let zs = ZeroizingString::new("secret mnemonic".to_string());
        assert_eq!(&*zs, "secret mnemonic");
    }

    #[test]
    fn zeroizing_string_debug_is_redacted() {
        let zs = ZeroizingString::from("abandon abandon about");
        let debug = format!("{zs:?}");
        assert!(!debug.contains("abandon"));
    }

    #[test]
    fn zeroizing_string_manual_zeroize() {
        let mut zs = ZeroizingString::new("sensitive".into());
        zs.zeroize();
        assert!(zs.is_empty());
    }

    #[test]
    fn secret_key_from_hex_accepts_valid_key() {
        let key = SecretKeyBytes::from_hex(KEY_HEX).unwrap();
        assert_eq!(key.as_bytes()[0], 0x4c);
        assert_eq!(key.as_bytes()[31], 0x18);
    }

    #[test]
    fn secret_key_accepts_uppercase_digits() {
        let upper = format!("0x{}", KEY_HEX[2..].to_uppercase());
        let key = SecretKeyBytes::from_hex(&upper).unwrap();
        assert_eq!(&*key.to_hex(), KEY_HEX);
    }

    #[test]
    fn secret_key_hex_round_trip() {
        let key = SecretKeyBytes::from_hex(KEY_HEX).unwrap();
        assert_eq!(&*key.to_hex(), KEY_HEX);
    }

    #[test]
    fn secret_key_requires_prefix() {
        let err = SecretKeyBytes::from_hex(&KEY_HEX[2..]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidInput(_)));
    }

    #[test]
    fn secret_key_rejects_uppercase_prefix() {
        let input = format!("0X{}", &KEY_HEX[2..]);
        assert!(SecretKeyBytes::from_hex(&input).is_err());
    }

    #[test]
    fn secret_key_rejects_short_input() {
        let err = SecretKeyBytes::from_hex(&KEY_HEX[..64]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength { expected: 32, .. }
        ));
    }

    #[test]
    fn secret_key_odd_length_reports_digit_count() {
        let err = SecretKeyBytes::from_hex(&KEY_HEX[..65]).unwrap_err();
        match err {
            CryptoError::InvalidInput(msg) => assert!(msg.contains("(63)"), "{msg}"),
            other => panic!("expected odd-length error, got {other:?}"),
        }
        let err = SecretKeyBytes::from_hex(&KEY_HEX[..64]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength { expected: 32, actual: 31 }
        ));
    }

    #[test]
    fn secret_key_rejects_long_input() {
        let input = format!("{KEY_HEX}00");
        assert!(SecretKeyBytes::from_hex(&input).is_err());
    }

    #[test]
    fn secret_key_rejects_non_hex() {
        let input = format!("0x{}zz", &KEY_HEX[4..]);
        let err = SecretKeyBytes::from_hex(&input).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidInput(_)));
    }

    #[test]
    fn secret_key_debug_is_redacted() {
        let key = SecretKeyBytes::from_hex(KEY_HEX).unwrap();
        assert_eq!(format!("{key:?}"), "SecretKeyBytes(***)");
    }
}
