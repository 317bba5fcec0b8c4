//! Seams for the external wallet SDK, mnemonic library and network provider.
//!
//! Nothing in this crate derives keys, selects coins or signs. Those belong to
//! whatever implements these traits; the services only drive them and reshape
//! what comes back.

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::blockchain::models::{
    AddressNotification, Balance, Network, ProviderBalance, RawTransaction, SdkError,
    SignedTransaction, Utxo,
};

/// Entry point of the wallet SDK: builds wallets and checks addresses.
#[async_trait]
pub trait WalletSdk: Send + Sync {
    /// Constructs a wallet from a mnemonic. Account discovery happens in
    /// [`SdkWallet::initialize`].
    async fn open_wallet(
        &self,
        mnemonic: &SecretString,
        network: Network,
    ) -> Result<Arc<dyn SdkWallet>, SdkError>;

    fn is_valid_address(&self, address: &str, network: Network) -> Result<bool, SdkError>;
}

/// A wallet built by the SDK, holding the HD tree and its accounts.
#[async_trait]
pub trait SdkWallet: Send + Sync {
    async fn initialize(&self) -> Result<(), SdkError>;

    fn list_accounts(&self) -> Vec<String>;

    fn get_account(&self, id: &str) -> Option<Arc<dyn SdkAccount>>;

    /// Opens the SDK's fluent transaction pipeline for `account`.
    fn new_transaction(&self, account: Arc<dyn SdkAccount>) -> Box<dyn TransactionBuilder>;

    /// Broadcasts a built transaction and returns its txid.
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<String, SdkError>;

    async fn subscribe_addresses(
        &self,
        addresses: &[String],
        sink: UnboundedSender<AddressNotification>,
    ) -> Result<u64, SdkError>;

    async fn unsubscribe_addresses(&self, subscription_id: u64) -> Result<(), SdkError>;
}

/// One account of an SDK wallet.
#[async_trait]
pub trait SdkAccount: Send + Sync {
    fn id(&self) -> String;

    /// Raw key material in whatever layout this account type uses.
    fn keys(&self) -> AccountKeys;

    fn balance(&self) -> Option<Balance>;

    /// Re-syncs the account (and its balance) with the network.
    async fn refresh(&self) -> Result<(), SdkError>;

    async fn get_transactions(&self) -> Result<Vec<RawTransaction>, SdkError>;

    fn addresses(&self) -> Vec<String>;

    /// Derives the next unused receive address, for accounts whose receive
    /// keys carry no address yet. `None` when the account cannot derive one.
    fn new_address(&self) -> Option<String> {
        None
    }
}

/// Stages of the SDK transaction pipeline. Callers run them in declaration order.
#[async_trait]
pub trait TransactionBuilder: Send {
    fn on_network(&mut self, network: Network);

    fn send_to(&mut self, address: &str, amount: u64);

    /// Fetches spendable inputs and computes fees.
    async fn populate(&mut self) -> Result<(), SdkError>;

    async fn sign(&mut self) -> Result<(), SdkError>;

    async fn build(&mut self) -> Result<SignedTransaction, SdkError>;
}

/// BIP39-compatible mnemonic generator/validator.
pub trait MnemonicSource: Send + Sync {
    fn generate(&self) -> Result<SecretString, SdkError>;

    /// Checksum and wordlist membership.
    fn validate(&self, phrase: &str) -> bool;
}

/// Electrum-style network provider.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    async fn connect(&self, network: Network) -> Result<(), SdkError>;

    async fn disconnect(&self) -> Result<(), SdkError>;

    async fn get_balance(&self, address: &str) -> Result<ProviderBalance, SdkError>;

    async fn get_utxos(&self, address: &str) -> Result<Vec<Utxo>, SdkError>;
}

/// Hands out a provider for a network; the HTTP layer opens one per request.
pub trait ProviderFactory: Send + Sync {
    fn provider(&self, network: Network) -> Arc<dyn NetworkProvider>;
}

// --- Account shape adapter ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: Option<String>,
    pub private_key_wif: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEntry {
    pub address: Option<String>,
    pub key: Option<KeyPair>,
}

impl KeyEntry {
    fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Key layout reported by an account. Multi-address accounts fill
/// `receive_keys`; legacy single-address accounts fill `account_key`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountKeys {
    pub receive_keys: Option<Vec<KeyEntry>>,
    pub account_key: Option<KeyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountShape {
    ReceiveKeyList(Vec<KeyEntry>),
    SingleKey(KeyEntry),
}

impl AccountShape {
    /// Resolves the layout once. A receive list with a usable first entry
    /// wins over a single key; a single key is the fallback.
    pub fn resolve(keys: AccountKeys) -> Option<AccountShape> {
        if let Some(list) = keys.receive_keys {
            if list.first().is_some_and(KeyEntry::has_address) {
                return Some(AccountShape::ReceiveKeyList(list));
            }
        }
        keys.account_key
            .filter(KeyEntry::has_address)
            .map(AccountShape::SingleKey)
    }

    /// The entry whose address becomes the wallet's primary address.
    pub fn primary(&self) -> &KeyEntry {
        match self {
            AccountShape::ReceiveKeyList(list) => &list[0],
            AccountShape::SingleKey(entry) => entry,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AccountShape::ReceiveKeyList(_) => "receive-key-list",
            AccountShape::SingleKey(_) => "single-key",
        }
    }
}
