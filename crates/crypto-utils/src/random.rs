use rand::RngCore;
use rand_core::OsRng;

/// Entropy size for a 12-word BIP-39 mnemonic.
pub const MNEMONIC_ENTROPY_LEN: usize = 16;

/// Generates a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes_fixed<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Fresh entropy for a new 12-word mnemonic, drawn from the OS CSPRNG.
///
/// The caller owns the buffer and must zeroize it once the phrase is built.
pub fn mnemonic_entropy() -> [u8; MNEMONIC_ENTROPY_LEN] {
    random_bytes_fixed()
}
