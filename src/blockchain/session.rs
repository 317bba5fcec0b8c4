// src/blockchain/session.rs

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::blockchain::models::{Network, WalletError};
use crate::blockchain::sdk::NetworkProvider;

/// Connection context shared by the wallet operations.
///
/// The mutex is held across the provider call, so concurrent callers connect
/// once and the session is never bound to two networks at the same time.
pub struct NetworkSession {
    provider: Arc<dyn NetworkProvider>,
    connected: Mutex<Option<Network>>,
}

impl NetworkSession {
    pub fn init(provider: Arc<dyn NetworkProvider>) -> Self {
        Self {
            provider,
            connected: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &Arc<dyn NetworkProvider> {
        &self.provider
    }

    /// Connects to `network`, reusing the connection if already there and
    /// switching over if connected elsewhere.
    pub async fn connect(&self, network: Network) -> Result<(), WalletError> {
        let mut connected = self.connected.lock().await;
        match *connected {
            Some(current) if current == network => return Ok(()),
            Some(current) => {
                info!("Switching provider connection from {} to {}", current, network);
                if let Err(e) = self.provider.disconnect().await {
                    warn!("Disconnect from {} failed: {}", current, e);
                }
                *connected = None;
            }
            None => {}
        }

        self.provider
            .connect(network)
            .await
            .map_err(|e| WalletError::SdkConnection(format!("{}: {}", network, e)))?;
        *connected = Some(network);
        info!("Provider connected to {}", network);
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.connected.lock().await.is_some()
    }

    pub async fn connected_network(&self) -> Option<Network> {
        *self.connected.lock().await
    }

    pub async fn close(&self) {
        let mut connected = self.connected.lock().await;
        if let Some(network) = connected.take() {
            if let Err(e) = self.provider.disconnect().await {
                warn!("Disconnect from {} failed: {}", network, e);
            }
            info!("Provider connection to {} closed", network);
        }
    }
}
