// src/blockchain/client.rs

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::blockchain::models::{
    AddressNotification, Network, TransactionHistoryEntry, TransactionResult, WalletError,
    WalletRecord,
};
use crate::blockchain::rostrum::RostrumProvider;
use crate::blockchain::sdk::{MnemonicSource, NetworkProvider, SdkAccount, WalletSdk};
use crate::blockchain::services::balance::{self as balance_service, RefreshOptions};
use crate::blockchain::services::history::{self as history_service, TransactionSubscription};
use crate::blockchain::services::transactions::{self, SendRequest};
use crate::blockchain::services::wallet as wallet_service;
use crate::blockchain::session::NetworkSession;
use crate::config::AppConfig;

// --- NexaClient Implementation ---

/// Bundles the SDK, the mnemonic source and one [`NetworkSession`] so the UI
/// layer can call each operation without threading them through itself.
#[derive(Clone)]
pub struct NexaClient {
    sdk: Arc<dyn WalletSdk>,
    mnemonics: Arc<dyn MnemonicSource>,
    session: Arc<NetworkSession>,
    refresh: RefreshOptions,
}

impl NexaClient {
    pub fn new(
        sdk: Arc<dyn WalletSdk>,
        mnemonics: Arc<dyn MnemonicSource>,
        provider: Arc<dyn NetworkProvider>,
    ) -> Self {
        Self {
            sdk,
            mnemonics,
            session: Arc::new(NetworkSession::init(provider)),
            refresh: RefreshOptions::default(),
        }
    }

    /// Client on the configured Rostrum endpoints, polling balances with the
    /// configured interval and deadline.
    pub fn from_config(
        sdk: Arc<dyn WalletSdk>,
        mnemonics: Arc<dyn MnemonicSource>,
        config: &AppConfig,
    ) -> Self {
        let provider = Arc::new(RostrumProvider::new(
            config.rostrum_endpoints(),
            config.rostrum_timeout(),
        ));
        Self::new(sdk, mnemonics, provider).with_refresh_options(config.refresh_options())
    }

    pub fn with_refresh_options(mut self, refresh: RefreshOptions) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn refresh_options(&self) -> RefreshOptions {
        self.refresh
    }

    pub fn session(&self) -> &NetworkSession {
        &self.session
    }

    /// Generates a new HD wallet with a fresh mnemonic.
    pub async fn generate_wallet(&self, network: Network) -> Result<WalletRecord, WalletError> {
        wallet_service::generate_wallet(&self.session, self.sdk.as_ref(), self.mnemonics.as_ref(), network)
            .await
    }

    /// Restores a wallet from an existing mnemonic.
    pub async fn import_from_seed_phrase(
        &self,
        seed_phrase: &str,
        network: Network,
    ) -> Result<WalletRecord, WalletError> {
        wallet_service::import_from_seed_phrase(
            &self.session,
            self.sdk.as_ref(),
            self.mnemonics.as_ref(),
            seed_phrase,
            network,
        )
        .await
    }

    pub async fn get_balance(
        &self,
        address: &str,
        network: Network,
        account: Option<&dyn SdkAccount>,
    ) -> u64 {
        balance_service::get_balance(&self.session, address, network, account).await
    }

    /// Polls the record's account until its balance settles, using this
    /// client's refresh options.
    pub async fn refresh_balance(
        &self,
        record: &mut WalletRecord,
        cancel: &CancellationToken,
    ) -> Result<u64, WalletError> {
        balance_service::refresh_balance(record, self.refresh, cancel).await
    }

    pub async fn send_transaction(
        &self,
        request: SendRequest,
    ) -> Result<TransactionResult, WalletError> {
        transactions::send_transaction(&self.session, self.sdk.as_ref(), request).await
    }

    pub fn validate_address(&self, address: &str) -> bool {
        transactions::validate_address(self.sdk.as_ref(), address)
    }

    pub async fn get_transaction_history(
        &self,
        account: Option<&dyn SdkAccount>,
    ) -> Vec<TransactionHistoryEntry> {
        history_service::get_transaction_history(account).await
    }

    pub async fn subscribe_to_transactions(
        &self,
        record: &WalletRecord,
        sink: UnboundedSender<AddressNotification>,
    ) -> TransactionSubscription {
        history_service::subscribe_to_transactions(record.wallet.clone(), record.account.as_ref(), sink)
            .await
    }

    /// Drops the provider connection; the next operation reconnects.
    pub async fn disconnect(&self) {
        self.session.close().await;
    }
}
