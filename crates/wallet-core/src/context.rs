use std::sync::Arc;

use eth_rpc::{RpcClient, RpcSession};
use parking_lot::RwLock;
use tracing::info;

use crate::error::WalletError;
use crate::signer::{Account, GeneratedWallet, KeySigner};

/// Everything one operation needs, captured when it starts.
///
/// Swapping the endpoint or the account on the [`WalletSession`] afterwards
/// does not affect an operation already holding a context.
#[derive(Debug, Clone)]
pub struct WalletContext {
    rpc: Arc<RpcSession>,
    signer: Option<Arc<KeySigner>>,
}

impl WalletContext {
    pub fn new(rpc: Arc<RpcSession>, signer: Option<Arc<KeySigner>>) -> Self {
        Self { rpc, signer }
    }

    pub fn rpc(&self) -> &RpcSession {
        &self.rpc
    }

    pub fn signer(&self) -> Option<&KeySigner> {
        self.signer.as_deref()
    }

    /// The active signer, or `Precondition("wallet required")`.
    pub fn require_signer(&self) -> Result<&KeySigner, WalletError> {
        self.signer()
            .ok_or_else(|| WalletError::precondition("wallet required"))
    }

    pub fn account(&self) -> Option<Account> {
        self.signer().map(KeySigner::account)
    }
}

/// The mutable pair the UI works with: one RPC client and at most one
/// signer. Operations never read these directly; they take a
/// [`WalletContext`] snapshot via [`context`](Self::context).
pub struct WalletSession {
    client: Arc<RpcClient>,
    signer: RwLock<Option<Arc<KeySigner>>>,
}

impl WalletSession {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self {
            client,
            signer: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    pub fn context(&self) -> WalletContext {
        WalletContext::new(self.client.session(), self.signer.read().clone())
    }

    pub fn account(&self) -> Option<Account> {
        self.signer.read().as_ref().map(|s| s.account())
    }

    /// Makes `signer` the active account, replacing any previous one.
    pub fn set_signer(&self, signer: KeySigner) -> Account {
        let account = signer.account();
        *self.signer.write() = Some(Arc::new(signer));
        info!("Active account is now {}", account.address_checksummed());
        account
    }

    pub fn clear_signer(&self) {
        *self.signer.write() = None;
    }

    /// Generates a key, activates it and hands back the one-time secrets.
    pub fn generate_account(&self) -> Result<GeneratedAccount, WalletError> {
        let GeneratedWallet {
            signer,
            private_key,
            mnemonic,
        } = KeySigner::generate()?;
        let account = self.set_signer(signer);
        Ok(GeneratedAccount {
            account,
            private_key,
            mnemonic,
        })
    }

    pub fn import_private_key(&self, hex_key: &str) -> Result<Account, WalletError> {
        Ok(self.set_signer(KeySigner::import_from_private_key(hex_key)?))
    }

    pub fn import_mnemonic(&self, phrase: &str) -> Result<Account, WalletError> {
        Ok(self.set_signer(KeySigner::import_from_mnemonic(phrase)?))
    }
}

/// Result of [`WalletSession::generate_account`].
pub struct GeneratedAccount {
    pub account: Account,
    pub private_key: secrecy::SecretString,
    pub mnemonic: secrecy::SecretString,
}

impl std::fmt::Debug for GeneratedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedAccount")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use eth_rpc::config::{ClientSettings, MemoryEndpointStore};
    use eth_rpc::scripted::{ScriptedConnector, ScriptedTransport};

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn wallet_session() -> WalletSession {
        let transport = Arc::new(ScriptedTransport::new());
        let client = RpcClient::with_connector(
            Arc::new(MemoryEndpointStore::with_url("https://a.example")),
            Arc::new(ScriptedConnector::new(transport)),
            ClientSettings::default(),
        )
        .unwrap();
        WalletSession::new(Arc::new(client))
    }

    #[test]
    fn context_without_signer_requires_wallet() {
        let session = wallet_session();
        let err = session.context().require_signer().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.to_string(), "wallet required");
    }

    #[test]
    fn snapshot_keeps_signer_after_swap() {
        let session = wallet_session();
        let account = session.import_private_key(KEY).unwrap();
        let before = session.context();

        session.generate_account().unwrap();
        assert_ne!(session.account(), Some(account));
        assert_eq!(before.account(), Some(account));

        session.clear_signer();
        assert!(session.context().signer().is_none());
        assert!(before.signer().is_some());
    }

    #[tokio::test]
    async fn snapshot_keeps_endpoint_after_switch() {
        let session = wallet_session();
        let before = session.context();
        session.client().set_endpoint("https://b.example").await.unwrap();
        assert_eq!(before.rpc().endpoint().as_str(), "https://a.example");
        assert_eq!(session.context().rpc().endpoint().as_str(), "https://b.example");
    }

    #[test]
    fn failed_import_keeps_previous_account() {
        let session = wallet_session();
        let account = session.import_private_key(KEY).unwrap();
        assert!(session.import_mnemonic("not a phrase").is_err());
        assert_eq!(session.account(), Some(account));
    }
}
