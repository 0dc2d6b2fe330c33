//! # crypto-utils
//!
//! Secure random generation and zeroizing containers for the key material the
//! dashboard holds in memory for a session.

pub mod error;
pub mod random;
pub mod zeroizing;

pub use error::CryptoError;
pub use zeroizing::{SecretKeyBytes, ZeroizingString};
