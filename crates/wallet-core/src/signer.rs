use std::fmt;
use std::time::Duration;

use alloy_primitives::Address;
use chain_eth::address::to_checksum;
use chain_eth::transaction::{sign_message, SignedTransaction, UnsignedTransaction};
use crypto_utils::SecretKeyBytes;
use eth_rpc::{ReceiptStatus, RpcSession, TransactionReceipt};
use k256::ecdsa::SigningKey;
use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::hd_derivation::{derive_secp256k1_key, signing_key_from_secret, ETH_DERIVATION_PATH};
use crate::intent::{ChainContext, TransactionIntent};
use crate::mnemonic::{generate_mnemonic, mnemonic_to_seed};

/// Public half of the active key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
}

impl Account {
    /// EIP-55 form of the address.
    pub fn address_checksummed(&self) -> String {
        to_checksum(&self.address)
    }
}

/// Holds one signing key for the session. Key material never leaves this
/// type except through [`GeneratedWallet`] right after generation.
pub struct KeySigner {
    key: SigningKey,
    account: Account,
}

/// A freshly generated key together with the secrets needed to recover it.
/// The secrets are shown to the user once and wiped on drop.
pub struct GeneratedWallet {
    pub signer: KeySigner,
    pub private_key: SecretString,
    pub mnemonic: SecretString,
}

impl KeySigner {
    /// New random key derived from a fresh 12-word mnemonic.
    pub fn generate() -> Result<GeneratedWallet, WalletError> {
        let mnemonic = generate_mnemonic()?;
        let mut seed = mnemonic_to_seed(&mnemonic, "")?;
        let secret = derive_secp256k1_key(&seed, ETH_DERIVATION_PATH);
        seed.zeroize();
        let secret = secret?;

        let signer = Self::from_secret(&secret)?;
        info!("Generated account {}", signer.account.address_checksummed());
        Ok(GeneratedWallet {
            signer,
            private_key: SecretString::from(secret.to_hex().to_string()),
            mnemonic: SecretString::from(mnemonic.to_string()),
        })
    }

    /// Imports a `0x`-prefixed 32-byte hex private key.
    pub fn import_from_private_key(hex_key: &str) -> Result<Self, WalletError> {
        let secret = SecretKeyBytes::from_hex(hex_key.trim())?;
        Self::from_secret(&secret)
    }

    /// Imports the first account (m/44'/60'/0'/0/0) of a BIP-39 phrase.
    /// Whitespace and letter case are normalized first.
    pub fn import_from_mnemonic(phrase: &str) -> Result<Self, WalletError> {
        let mut seed = mnemonic_to_seed(phrase, "")?;
        let secret = derive_secp256k1_key(&seed, ETH_DERIVATION_PATH);
        seed.zeroize();
        Self::from_secret(&secret?)
    }

    fn from_secret(secret: &SecretKeyBytes) -> Result<Self, WalletError> {
        let key = signing_key_from_secret(secret)?;
        let address = chain_eth::address::verifying_key_to_address(key.verifying_key());
        Ok(Self {
            key,
            account: Account { address },
        })
    }

    pub fn account(&self) -> Account {
        self.account
    }

    pub fn address(&self) -> Address {
        self.account.address
    }

    /// Signs an already-populated transaction.
    pub fn sign_transaction(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, WalletError> {
        Ok(tx.sign(&self.key)?)
    }

    /// Signs `intent` for `chain`. Gas and fees must already be resolved.
    pub fn sign(&self, intent: &TransactionIntent, chain: &ChainContext) -> Result<SignedTransaction, WalletError> {
        self.sign_transaction(&intent.to_unsigned(chain)?)
    }

    /// EIP-191 `personal_sign`; 65 bytes `r || s || v`.
    pub fn sign_message(&self, message: &[u8]) -> Result<[u8; 65], WalletError> {
        Ok(sign_message(message, &self.key)?)
    }

    /// Fills in nonce and chain id from `session`, signs and broadcasts.
    ///
    /// Only the signed bytes go over the wire. Broadcast is attempted once.
    pub async fn send_signed(
        &self,
        intent: &TransactionIntent,
        session: &RpcSession,
    ) -> Result<PendingTransaction, WalletError> {
        let chain_id = session.chain_id().await?;
        let nonce = session.get_transaction_count(self.address()).await?;
        let signed = self.sign(intent, &ChainContext { chain_id, nonce })?;
        debug!(chain_id, nonce, "signed transaction {}", signed.hash_hex());

        let hash = session.send_raw_transaction(&signed.raw).await?;
        info!("Broadcast transaction {hash} from {}", self.account.address_checksummed());

        Ok(PendingTransaction {
            hash,
            session: session.clone(),
            poll_interval: session.settings().receipt_poll_interval,
        })
    }
}

impl fmt::Debug for KeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySigner")
            .field("address", &self.account.address_checksummed())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for GeneratedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedWallet")
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

/// A broadcast transaction that may not be mined yet.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub hash: String,
    session: RpcSession,
    poll_interval: Duration,
}

impl PendingTransaction {
    /// Polls for the receipt until the transaction is mined. There is no
    /// timeout; drop the future to stop waiting.
    pub async fn wait(&self) -> Result<TransactionReceipt, WalletError> {
        loop {
            if let Some(receipt) = self.session.get_transaction_receipt(&self.hash).await? {
                info!(
                    "Transaction {} mined in block {} ({:?})",
                    self.hash, receipt.block_number, receipt.status
                );
                return Ok(receipt);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Outcome reported to the UI for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub transaction_hash: String,
    pub block_number: u64,
    /// Decimal string.
    pub gas_used: String,
    pub status: ReceiptStatus,
}

impl From<&TransactionReceipt> for ReceiptSummary {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash.clone(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used.to_string(),
            status: receipt.status,
        }
    }
}
