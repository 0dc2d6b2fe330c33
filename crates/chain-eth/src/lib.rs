//! Ethereum/EVM chain primitives for the wallet dashboard.
//!
//! This crate provides:
//! - Ethereum address derivation from secp256k1 public keys (with EIP-55 checksums)
//! - Legacy (EIP-155) and EIP-1559 transaction encoding, signing and signer recovery
//! - Contract ABI parsing, encoding and decoding, including revert reasons
//! - Integer smallest-unit arithmetic and decimal presentation
//! - Names of well-known EVM networks

pub mod abi;
pub mod address;
pub mod chains;
pub mod error;
pub mod transaction;
pub mod units;

pub use error::EthError;
