use bip39::{Language, Mnemonic};
use crypto_utils::random::mnemonic_entropy;
use crypto_utils::ZeroizingString;
use zeroize::Zeroize;

use crate::error::WalletError;

/// Words in a generated phrase (128 bits of entropy).
pub const GENERATED_WORD_COUNT: usize = 12;

/// Generate a new 12-word BIP-39 mnemonic from the OS CSPRNG.
pub fn generate_mnemonic() -> Result<ZeroizingString, WalletError> {
    let mut entropy = mnemonic_entropy();
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::validation(format!("invalid mnemonic: {e}")));
    entropy.zeroize();
    Ok(ZeroizingString::new(mnemonic?.to_string()))
}

/// Lowercases and collapses whitespace so pasted phrases validate.
pub fn normalize_phrase(phrase: &str) -> ZeroizingString {
    let words: Vec<String> = phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    ZeroizingString::new(words.join(" "))
}

/// Validate a mnemonic phrase (wordlist and checksum).
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, &normalize_phrase(phrase)).is_ok()
}

/// Derive seed bytes from mnemonic + optional passphrase.
/// Returns the 64-byte seed. Caller MUST zeroize the returned seed when done.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<[u8; 64], WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalize_phrase(phrase))
        .map_err(|e| WalletError::validation(format!("invalid mnemonic: {e}")))?;
    Ok(mnemonic.to_seed(passphrase))
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_mnemonic_12_words() {
        let mnemonic = generate_mnemonic().unwrap();
        assert_eq!(mnemonic.split_whitespace().count(), GENERATED_WORD_COUNT);
        assert!(validate_mnemonic(&mnemonic));
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        let a = generate_mnemonic().unwrap();
        let b = generate_mnemonic().unwrap();
        assert_ne!(&*a, &*b);
    }

    #[test]
    fn test_validate_invalid_mnemonic() {
        assert!(!validate_mnemonic("invalid mnemonic phrase here"));
        // Valid words, bad checksum.
        assert!(!validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
        ));
        assert!(!validate_mnemonic(""));
    }

    #[test]
    fn test_normalization_accepts_messy_input() {
        let messy = "  ABANDON abandon\tabandon abandon abandon abandon\n abandon abandon abandon abandon abandon About  ";
        assert_eq!(&*normalize_phrase(messy), PHRASE);
        assert!(validate_mnemonic(messy));
        assert_eq!(
            mnemonic_to_seed(messy, "").unwrap(),
            mnemonic_to_seed(PHRASE, "").unwrap()
        );
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let seed_no_pass = mnemonic_to_seed(PHRASE, "").unwrap();
        let seed_with_pass = mnemonic_to_seed(PHRASE, "mypassphrase").unwrap();
        assert_ne!(seed_no_pass, seed_with_pass);
    }

    #[test]
    fn test_bip39_test_vector() {
        let seed = mnemonic_to_seed(PHRASE, "").unwrap();
        assert_eq!(
            hex::encode(seed),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_is_valid_word() {
        assert!(is_valid_word("abandon"));
        assert!(is_valid_word("zoo"));
        assert!(!is_valid_word("notaword"));
        assert!(!is_valid_word(""));
    }
}
