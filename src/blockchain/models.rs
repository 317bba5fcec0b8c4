// src/blockchain/models.rs
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::sdk::{SdkAccount, SdkWallet};

/// Smallest units per whole NEXA. Nexa uses 100, not the 10^8 of Bitcoin-style chains.
pub const SATS_PER_NEXA: u64 = 100;

/// Minimum amount the network relays, in smallest units (10 NEXA).
pub const DUST_THRESHOLD: u64 = 1000;

// --- Error types ---

/// Errors reported by an SDK adapter, already classified by kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    #[error("dust output rejected: {0}")]
    Dust(String),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("sdk unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// Classifies a free-text SDK message. Adapters call this once at the
    /// boundary; nothing past the adapter inspects message text.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("dust") {
            SdkError::Dust(message)
        } else if lower.contains("insufficient") {
            SdkError::InsufficientFunds(message)
        } else {
            SdkError::Other(message)
        }
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("amount too small (dust): {amount} is below the minimum of 1000 (10 NEXA)")]
    DustAmount { amount: u64 },
    #[error("insufficient balance, check your balance and try again")]
    InsufficientBalance,
    #[error("invalid recipient address: {0}")]
    InvalidAddress(String),
    #[error("no usable account in wallet: {0}")]
    AccountUnavailable(String),
    #[error("account {account_id} exposes no receiving address")]
    AddressUnavailable { account_id: String },
    #[error("network connection failed: {0}")]
    SdkConnection(String),
    #[error("balance did not settle before the deadline (last seen {last_balance})")]
    RefreshTimedOut { last_balance: u64 },
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

// --- Network ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Testnet, Network::Mainnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    /// Human-readable address prefix, including the separator.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "nexa:",
            Network::Testnet => "nexatest:",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

// --- Balance ---

/// Confirmed/unconfirmed split as reported by an account or provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub confirmed: Option<i64>,
    pub unconfirmed: Option<i64>,
}

impl Balance {
    pub fn new(confirmed: i64, unconfirmed: i64) -> Self {
        Self {
            confirmed: Some(confirmed),
            unconfirmed: Some(unconfirmed),
        }
    }

    /// Confirmed plus unconfirmed. Missing fields count as zero and a
    /// pending spend can never drive the total below zero.
    pub fn total(&self) -> u64 {
        let sum = i128::from(self.confirmed.unwrap_or(0)) + i128::from(self.unconfirmed.unwrap_or(0));
        u64::try_from(sum.max(0)).unwrap_or(u64::MAX)
    }

    pub fn is_settled(&self) -> bool {
        self.unconfirmed.unwrap_or(0) == 0
    }
}

// --- Wallet Models ---

/// A wallet session handed to the UI layer.
pub struct WalletRecord {
    pub seed_phrase: SecretString,
    pub address: String,
    pub public_key: String,
    pub private_key: SecretString,
    pub balance: u64,
    pub network: Network,
    pub wallet: Arc<dyn SdkWallet>,
    pub account: Arc<dyn SdkAccount>,
}

impl WalletRecord {
    pub fn account_id(&self) -> String {
        self.account.id()
    }

    pub fn set_balance(&mut self, balance: u64) {
        self.balance = balance;
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("seed_phrase", &self.seed_phrase)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .field("balance", &self.balance)
            .field("network", &self.network)
            .field("account", &self.account.id())
            .finish_non_exhaustive()
    }
}

// --- Transaction Models ---

/// Outcome of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub txid: String,
    pub success: bool,
    pub message: String,
}

/// A transaction already built and signed by the SDK, ready to broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hex: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxDirection {
    Received,
    Sent,
}

/// Transaction record as the SDK adapter reports it, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTransaction {
    pub txid: String,
    /// Signed net amount for the account in smallest units.
    pub amount: i64,
    pub timestamp: Option<i64>,
    pub confirmations: Option<u64>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryEntry {
    pub txid: String,
    pub amount: u64,
    #[serde(rename = "type")]
    pub direction: TxDirection,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub confirmations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_confirmed: bool,
}

// --- Provider Models ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    pub height: u64,
}

/// Balance-by-address response; providers return either shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderBalance {
    Split(Balance),
    Total(u64),
}

impl ProviderBalance {
    pub fn total(&self) -> u64 {
        match self {
            ProviderBalance::Split(balance) => balance.total(),
            ProviderBalance::Total(total) => *total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressNotification {
    pub address: String,
    pub status: Option<String>,
}
