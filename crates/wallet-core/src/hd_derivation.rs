use bip32::{DerivationPath, XPrv};
use crypto_utils::SecretKeyBytes;
use k256::ecdsa::SigningKey;

use crate::error::WalletError;

/// BIP-44 path of the first Ethereum account: m/44'/60'/0'/0/0.
/// Every EVM chain uses the same path; chains differ only by chain id.
pub const ETH_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// BIP-44 path for an arbitrary account/address index.
pub fn eth_derivation_path(account: u32, index: u32) -> String {
    format!("m/44'/60'/{account}'/0/{index}")
}

/// Derive a secp256k1 private key from a BIP-39 seed along `path`.
pub fn derive_secp256k1_key(seed: &[u8], path: &str) -> Result<SecretKeyBytes, WalletError> {
    let path: DerivationPath = path
        .parse()
        .map_err(|e: bip32::Error| WalletError::validation(format!("invalid derivation path: {e}")))?;

    let xprv = XPrv::derive_from_path(seed, &path)
        .map_err(|e| WalletError::validation(format!("key derivation failed: {e}")))?;

    Ok(SecretKeyBytes::new(xprv.to_bytes().into()))
}

/// Turns raw key bytes into a signing key, rejecting zero or out-of-range scalars.
pub fn signing_key_from_secret(secret: &SecretKeyBytes) -> Result<SigningKey, WalletError> {
    SigningKey::from_bytes(secret.as_bytes().into())
        .map_err(|_| WalletError::validation("private key is not a valid secp256k1 scalar"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;
    use chain_eth::address::{to_checksum, verifying_key_to_address};

    // BIP-39 test vector: "abandon" x11 + "about"
    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_seed() -> [u8; 64] {
        mnemonic_to_seed(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn test_derive_eth_key_known_address() {
        let secret = derive_secp256k1_key(&test_seed(), ETH_DERIVATION_PATH).unwrap();
        let key = signing_key_from_secret(&secret).unwrap();
        let address = verifying_key_to_address(key.verifying_key());
        assert_eq!(
            to_checksum(&address),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
    }

    #[test]
    fn test_derivation_deterministic() {
        let a = derive_secp256k1_key(&test_seed(), ETH_DERIVATION_PATH).unwrap();
        let b = derive_secp256k1_key(&test_seed(), ETH_DERIVATION_PATH).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_different_indices_different_keys() {
        let seed = test_seed();
        let k0 = derive_secp256k1_key(&seed, &eth_derivation_path(0, 0)).unwrap();
        let k1 = derive_secp256k1_key(&seed, &eth_derivation_path(0, 1)).unwrap();
        assert_ne!(k0.as_bytes(), k1.as_bytes());
        assert_eq!(eth_derivation_path(0, 0), ETH_DERIVATION_PATH);
    }

    #[test]
    fn test_invalid_path_rejected() {
        assert!(derive_secp256k1_key(&test_seed(), "44'/60'").is_err());
    }

    #[test]
    fn test_zero_scalar_rejected() {
        assert!(signing_key_from_secret(&SecretKeyBytes::new([0u8; 32])).is_err());
    }
}
