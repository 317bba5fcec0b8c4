use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::blockchain::models::{Network, SdkError, WalletError, WalletRecord};
use crate::blockchain::sdk::{
    AccountKeys, AccountShape, MnemonicSource, SdkAccount, SdkWallet, WalletSdk,
};
use crate::blockchain::session::NetworkSession;

/// Account reference wallets use. Other ids break interoperability with them.
pub const PRIMARY_ACCOUNT_ID: &str = "0";
/// Alternate single-address account type, used only when "0" is absent.
pub const FALLBACK_ACCOUNT_ID: &str = "1.0";

/// Fields pulled out of an SDK account.
#[derive(Debug)]
pub struct NormalizedAccount {
    pub address: String,
    pub public_key: String,
    pub private_key: SecretString,
    pub shape: &'static str,
}

pub async fn generate_wallet(
    session: &NetworkSession,
    sdk: &dyn WalletSdk,
    mnemonics: &dyn MnemonicSource,
    network: Network,
) -> Result<WalletRecord, WalletError> {
    info!("Generating a new {} wallet...", network);
    session.connect(network).await?;

    let mnemonic = mnemonics.generate()?;
    let record = open_wallet(sdk, mnemonic, network).await.inspect_err(|e| {
        error!("Error generating wallet: {}", e);
    })?;

    info!("Wallet generated: {}", record.address);
    Ok(record)
}

pub async fn import_from_seed_phrase(
    session: &NetworkSession,
    sdk: &dyn WalletSdk,
    mnemonics: &dyn MnemonicSource,
    seed_phrase: &str,
    network: Network,
) -> Result<WalletRecord, WalletError> {
    info!("Attempting to import a {} wallet...", network);
    let phrase = seed_phrase.trim();
    if !mnemonics.validate(phrase) {
        return Err(WalletError::InvalidMnemonic(
            "seed phrase failed checksum or wordlist validation".to_string(),
        ));
    }

    session.connect(network).await?;
    let record = open_wallet(sdk, SecretString::new(phrase.to_string()), network)
        .await
        .inspect_err(|e| {
            error!("Error importing wallet: {}", e);
        })?;

    info!("Wallet restored: {}", record.address);
    Ok(record)
}

/// Shared tail of generate and import: build, discover, pick the account, normalize.
async fn open_wallet(
    sdk: &dyn WalletSdk,
    mnemonic: SecretString,
    network: Network,
) -> Result<WalletRecord, WalletError> {
    let wallet = sdk
        .open_wallet(&mnemonic, network)
        .await
        .map_err(into_wallet_error)?;
    wallet.initialize().await.map_err(into_wallet_error)?;

    let account = select_account(wallet.as_ref())?;
    let normalized = normalize_account(account.as_ref())?;
    let balance = account.balance().unwrap_or_default();

    debug!(
        "Account {} normalized from {} shape (public key {}, private key {})",
        account.id(),
        normalized.shape,
        truncate(&normalized.public_key),
        if normalized.private_key.expose_secret().is_empty() {
            "none"
        } else {
            "present"
        }
    );

    Ok(WalletRecord {
        seed_phrase: mnemonic,
        address: normalized.address,
        public_key: normalized.public_key,
        private_key: normalized.private_key,
        balance: balance.total(),
        network,
        wallet,
        account,
    })
}

/// Account "0" first, then "1.0".
pub fn select_account(wallet: &dyn SdkWallet) -> Result<Arc<dyn SdkAccount>, WalletError> {
    debug!("Available accounts: {:?}", wallet.list_accounts());
    wallet
        .get_account(PRIMARY_ACCOUNT_ID)
        .or_else(|| wallet.get_account(FALLBACK_ACCOUNT_ID))
        .ok_or_else(|| {
            WalletError::AccountUnavailable(format!(
                "neither account '{}' nor '{}' exists after initialization",
                PRIMARY_ACCOUNT_ID, FALLBACK_ACCOUNT_ID
            ))
        })
}

/// Extracts address and key material from whichever layout the account uses.
/// Missing key material yields empty strings. When no layout carries an
/// address the account is asked for a fresh one; failing that it is an error.
pub fn normalize_account(account: &dyn SdkAccount) -> Result<NormalizedAccount, WalletError> {
    let keys = account.keys();
    let shape = match AccountShape::resolve(keys.clone()) {
        Some(shape) => shape,
        None => with_fresh_address(account, keys).ok_or_else(|| WalletError::AddressUnavailable {
            account_id: account.id(),
        })?,
    };

    let entry = shape.primary();
    let key = entry.key.clone().unwrap_or_default();
    Ok(NormalizedAccount {
        address: entry.address.clone().unwrap_or_default(),
        public_key: key.public_key.unwrap_or_default(),
        private_key: SecretString::new(key.private_key_wif.unwrap_or_default()),
        shape: shape.kind(),
    })
}

/// Fills the first receive key's missing address from `SdkAccount::new_address`.
fn with_fresh_address(account: &dyn SdkAccount, keys: AccountKeys) -> Option<AccountShape> {
    let mut list = keys.receive_keys.filter(|list| !list.is_empty())?;
    let address = account.new_address().filter(|address| !address.is_empty())?;
    debug!("Account {} receive key has no address, derived {}", account.id(), address);
    list[0].address = Some(address);
    Some(AccountShape::ReceiveKeyList(list))
}

fn into_wallet_error(e: SdkError) -> WalletError {
    match e {
        SdkError::Connection(msg) => WalletError::SdkConnection(msg),
        other => WalletError::Sdk(other),
    }
}

fn truncate(key: &str) -> String {
    if key.is_empty() {
        return "none".to_string();
    }
    let head: String = key.chars().take(20).collect();
    format!("{}...", head)
}
