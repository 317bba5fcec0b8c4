// src/blockchain/services/history.rs
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::blockchain::models::{
    AddressNotification, RawTransaction, TransactionHistoryEntry, TxDirection,
};
use crate::blockchain::sdk::{SdkAccount, SdkWallet};
use crate::blockchain::services::wallet::normalize_account;

/// History of `account` for display. Never fails: errors yield an empty list.
pub async fn get_transaction_history(
    account: Option<&dyn SdkAccount>,
) -> Vec<TransactionHistoryEntry> {
    let Some(account) = account else {
        return Vec::new();
    };

    match account.get_transactions().await {
        Ok(transactions) => {
            debug!(
                "Fetched {} transactions for account {}",
                transactions.len(),
                account.id()
            );
            let now = Utc::now().timestamp_millis();
            transactions
                .into_iter()
                .map(|tx| to_history_entry(tx, now))
                .collect()
        }
        Err(e) => {
            warn!("Error fetching transaction history for account {}: {}", account.id(), e);
            Vec::new()
        }
    }
}

/// Positive net amount means received; zero and negative mean sent.
fn to_history_entry(tx: RawTransaction, now_millis: i64) -> TransactionHistoryEntry {
    let direction = if tx.amount > 0 {
        TxDirection::Received
    } else {
        TxDirection::Sent
    };
    let confirmations = tx.confirmations.unwrap_or(0);
    TransactionHistoryEntry {
        txid: tx.txid,
        amount: tx.amount.unsigned_abs(),
        direction,
        timestamp: tx.timestamp.unwrap_or(now_millis),
        confirmations,
        address: tx.address.filter(|a| !a.is_empty()),
        is_confirmed: confirmations > 0,
    }
}

/// Live address subscription. Dropping it does not unsubscribe; call
/// [`TransactionSubscription::unsubscribe`].
pub struct TransactionSubscription {
    wallet: Arc<dyn SdkWallet>,
    subscription_id: Option<u64>,
    addresses: Vec<String>,
}

impl TransactionSubscription {
    pub fn is_active(&self) -> bool {
        self.subscription_id.is_some()
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub async fn unsubscribe(mut self) {
        if let Some(id) = self.subscription_id.take() {
            if let Err(e) = self.wallet.unsubscribe_addresses(id).await {
                warn!("Failed to unsubscribe {:?}: {}", self.addresses, e);
            }
        }
    }
}

/// Forwards address notifications for every address of `account` to `sink`.
/// A failed subscription comes back inert rather than as an error.
pub async fn subscribe_to_transactions(
    wallet: Arc<dyn SdkWallet>,
    account: &dyn SdkAccount,
    sink: UnboundedSender<AddressNotification>,
) -> TransactionSubscription {
    let mut addresses = account.addresses();
    if addresses.is_empty() {
        if let Ok(normalized) = normalize_account(account) {
            addresses.push(normalized.address);
        }
    }
    info!("Subscribing to addresses: {:?}", addresses);

    let subscription_id = if addresses.is_empty() {
        warn!("Account {} has no addresses to subscribe", account.id());
        None
    } else {
        match wallet.subscribe_addresses(&addresses, sink).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Error subscribing to transactions: {}", e);
                None
            }
        }
    };

    TransactionSubscription {
        wallet,
        subscription_id,
        addresses,
    }
}
