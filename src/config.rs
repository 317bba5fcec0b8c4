// src/config.rs

use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::error;

use crate::blockchain::models::Network;
use crate::blockchain::rostrum::RostrumEndpoints;
use crate::blockchain::services::balance::RefreshOptions;

pub const DEFAULT_MAINNET_ROSTRUM: &str = "electrum.nexa.org:20001";
pub const DEFAULT_TESTNET_ROSTRUM: &str = "testnet-electrum.nexa.org:30001";

// `Clone` is required because Axum's `with_state` method needs the state to be clonable.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub default_network: Network,
    pub rostrum_mainnet_url: String,
    pub rostrum_testnet_url: String,
    pub rostrum_timeout_secs: u64,
    pub balance_poll_interval_ms: u64,
    pub balance_poll_timeout_secs: u64,
}

impl AppConfig {
    /// Loads configuration from the process environment (after `.env`, if any).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup. Unset keys take
    /// their defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", 3000u16)?;
        let default_network = parse_or(&lookup, "NEXA_NETWORK", Network::Testnet)?;
        let rostrum_mainnet_url = lookup("ROSTRUM_MAINNET_URL")
            .unwrap_or_else(|| DEFAULT_MAINNET_ROSTRUM.to_string());
        let rostrum_testnet_url = lookup("ROSTRUM_TESTNET_URL")
            .unwrap_or_else(|| DEFAULT_TESTNET_ROSTRUM.to_string());
        let rostrum_timeout_secs = parse_or(&lookup, "ROSTRUM_TIMEOUT_SECS", 30u64)?;
        let balance_poll_interval_ms = parse_or(&lookup, "BALANCE_POLL_INTERVAL_MS", 1000u64)?;
        let balance_poll_timeout_secs = parse_or(&lookup, "BALANCE_POLL_TIMEOUT_SECS", 30u64)?;

        for (key, value) in [
            ("ROSTRUM_TIMEOUT_SECS", rostrum_timeout_secs),
            ("BALANCE_POLL_INTERVAL_MS", balance_poll_interval_ms),
            ("BALANCE_POLL_TIMEOUT_SECS", balance_poll_timeout_secs),
        ] {
            if value == 0 {
                error!("{} must be greater than zero.", key);
                return Err(anyhow!("{} must be greater than zero", key));
            }
        }

        Ok(Self {
            port,
            default_network,
            rostrum_mainnet_url,
            rostrum_testnet_url,
            rostrum_timeout_secs,
            balance_poll_interval_ms,
            balance_poll_timeout_secs,
        })
    }

    pub fn rostrum_endpoints(&self) -> RostrumEndpoints {
        RostrumEndpoints {
            mainnet: self.rostrum_mainnet_url.clone(),
            testnet: self.rostrum_testnet_url.clone(),
        }
    }

    pub fn rostrum_timeout(&self) -> Duration {
        Duration::from_secs(self.rostrum_timeout_secs)
    }

    pub fn refresh_options(&self) -> RefreshOptions {
        RefreshOptions {
            poll_interval: Duration::from_millis(self.balance_poll_interval_ms),
            timeout: Duration::from_secs(self.balance_poll_timeout_secs),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            error!("Invalid {} environment variable '{}': {}", key, raw, e);
            anyhow!("Invalid {}: {}", key, e)
        }),
    }
}
