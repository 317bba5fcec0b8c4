use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::models::{Network, WalletError, WalletRecord};
use crate::blockchain::sdk::SdkAccount;
use crate::blockchain::session::NetworkSession;

/// Balance in smallest units. Never fails: any error is logged and reported as 0.
pub async fn get_balance(
    session: &NetworkSession,
    address: &str,
    network: Network,
    account: Option<&dyn SdkAccount>,
) -> u64 {
    if let Some(balance) = account.and_then(|account| account.balance()) {
        let total = balance.total();
        debug!(
            "Balance from account: {} (confirmed: {:?}, unconfirmed: {:?})",
            total, balance.confirmed, balance.unconfirmed
        );
        return total;
    }

    match fetch_from_provider(session, address, network).await {
        Ok(total) => {
            info!("Balance for {}: {}", address, total);
            total
        }
        Err(e) => {
            warn!("Error fetching balance for {}: {}. Reporting 0.", address, e);
            0
        }
    }
}

async fn fetch_from_provider(
    session: &NetworkSession,
    address: &str,
    network: Network,
) -> Result<u64, WalletError> {
    session.connect(network).await?;
    let balance = session.provider().get_balance(address).await?;
    Ok(balance.total())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Re-syncs the record's account until its balance has no unconfirmed part.
///
/// Every observation is written to `record` as it arrives, so on timeout the
/// record holds the last balance seen. Failed refreshes inside the window are
/// retried on the next tick.
pub async fn refresh_balance(
    record: &mut WalletRecord,
    options: RefreshOptions,
    cancel: &CancellationToken,
) -> Result<u64, WalletError> {
    let account = record.account.clone();
    let deadline = Instant::now() + options.timeout;
    let mut last_balance = record.balance;

    loop {
        let refreshed = tokio::select! {
            _ = cancel.cancelled() => return Err(WalletError::Cancelled),
            refreshed = tokio::time::timeout_at(deadline, account.refresh()) => refreshed,
        };

        match refreshed {
            Ok(Ok(())) => {
                if let Some(balance) = account.balance() {
                    last_balance = balance.total();
                    record.set_balance(last_balance);
                    if balance.is_settled() {
                        info!("Balance settled for {}: {}", record.address, last_balance);
                        return Ok(last_balance);
                    }
                    debug!(
                        "Balance for {} still pending: {:?} unconfirmed",
                        record.address, balance.unconfirmed
                    );
                }
            }
            Ok(Err(e)) => warn!("Account refresh failed for {}: {}", record.address, e),
            Err(_) => return Err(WalletError::RefreshTimedOut { last_balance }),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(WalletError::RefreshTimedOut { last_balance });
        }
        let wait = options.poll_interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => return Err(WalletError::Cancelled),
            _ = tokio::time::sleep(wait) => {}
        }
    }
}
