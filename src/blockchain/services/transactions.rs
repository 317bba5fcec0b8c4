// src/blockchain/services/transactions.rs

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::blockchain::models::{
    DUST_THRESHOLD, Network, SdkError, TransactionResult, WalletError, WalletRecord,
};
use crate::blockchain::sdk::{SdkAccount, SdkWallet, WalletSdk};
use crate::blockchain::session::NetworkSession;
use crate::utils::format_nexa;

/// Everything a send needs. `amount` is in smallest units.
pub struct SendRequest {
    pub wallet: Arc<dyn SdkWallet>,
    pub account: Arc<dyn SdkAccount>,
    pub to_address: String,
    pub amount: u64,
    pub network: Network,
}

impl SendRequest {
    pub fn from_record(record: &WalletRecord, to_address: impl Into<String>, amount: u64) -> Self {
        Self {
            wallet: record.wallet.clone(),
            account: record.account.clone(),
            to_address: to_address.into(),
            amount,
            network: record.network,
        }
    }
}

/// Builds, signs and broadcasts a payment through the SDK pipeline.
///
/// The dust floor is checked before anything touches the SDK, then the
/// recipient. Failures are never swallowed and a failed broadcast is not
/// retried.
pub async fn send_transaction(
    session: &NetworkSession,
    sdk: &dyn WalletSdk,
    request: SendRequest,
) -> Result<TransactionResult, WalletError> {
    info!(
        "Initiating transfer of {} to {} on {}",
        request.amount, request.to_address, request.network
    );

    if request.amount < DUST_THRESHOLD {
        return Err(WalletError::DustAmount {
            amount: request.amount,
        });
    }
    if !validate_address(sdk, &request.to_address) {
        return Err(WalletError::InvalidAddress(request.to_address));
    }

    session.connect(request.network).await?;

    let txid = build_and_broadcast(&request).await.map_err(|e| {
        error!("Transaction error: {}", e);
        match e {
            SdkError::Dust(_) => WalletError::DustAmount {
                amount: request.amount,
            },
            SdkError::InsufficientFunds(_) => WalletError::InsufficientBalance,
            SdkError::Connection(msg) => WalletError::SdkConnection(msg),
            other => WalletError::Sdk(other),
        }
    })?;

    info!("Transaction broadcasted: {}", txid);
    Ok(TransactionResult {
        txid,
        success: true,
        message: format!(
            "Sent {} NEXA to {}",
            format_nexa(request.amount),
            request.to_address
        ),
    })
}

async fn build_and_broadcast(request: &SendRequest) -> Result<String, SdkError> {
    let mut builder = request.wallet.new_transaction(request.account.clone());
    builder.on_network(request.network);
    builder.send_to(&request.to_address, request.amount);
    builder.populate().await?;
    builder.sign().await?;
    let tx = builder.build().await?;
    debug!("Transaction built ({} hex chars)", tx.hex.len());

    request.wallet.send_transaction(&tx).await
}

/// Accepts the address if the SDK accepts it for any supported network.
/// Falls back to a prefix check if any SDK check failed outright.
pub fn validate_address(sdk: &dyn WalletSdk, address: &str) -> bool {
    let mut sdk_failed = false;
    for network in Network::ALL {
        match sdk.is_valid_address(address, network) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => {
                warn!("Address validation via SDK failed for {}: {}", network, e);
                sdk_failed = true;
            }
        }
    }
    sdk_failed && has_network_prefix(address)
}

/// Weak format check: the string starts with a known network prefix.
/// Not a substitute for SDK validation.
pub fn has_network_prefix(address: &str) -> bool {
    Network::ALL
        .iter()
        .any(|network| address.starts_with(network.address_prefix()))
}
