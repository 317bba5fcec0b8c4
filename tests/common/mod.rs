// In-memory stand-ins for the wallet SDK and network provider.
#![allow(dead_code)]

use async_trait::async_trait;
use nexa_wallet_rs::blockchain::models::{
    AddressNotification, Balance, Network, ProviderBalance, RawTransaction, SdkError,
    SignedTransaction, Utxo,
};
use nexa_wallet_rs::blockchain::sdk::{
    AccountKeys, KeyEntry, KeyPair, NetworkProvider, ProviderFactory, SdkAccount, SdkWallet,
    TransactionBuilder, WalletSdk,
};
use secrecy::{ExposeSecret, SecretString};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Stable fake address for a phrase, so import after generate lands on the same one.
pub fn derive_address(mnemonic: &str, network: Network) -> String {
    let hash = mnemonic
        .bytes()
        .fold(0xcbf29ce484222325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x100000001b3));
    format!("{}qq{:016x}", network.address_prefix(), hash)
}

pub fn key_entry(address: &str) -> KeyEntry {
    KeyEntry {
        address: Some(address.to_string()),
        key: Some(KeyPair {
            public_key: Some(format!("02{}", "ab".repeat(32))),
            private_key_wif: Some("cTestWifPrivateKey".to_string()),
        }),
    }
}

// --- Account ---

pub struct FakeAccount {
    pub id: String,
    pub keys: AccountKeys,
    pub balance: Mutex<Option<Balance>>,
    /// Each refresh pops the next balance; an `Err` makes that refresh fail.
    pub refresh_script: Mutex<VecDeque<Result<Balance, SdkError>>>,
    pub refresh_count: Mutex<u32>,
    pub transactions: Result<Vec<RawTransaction>, SdkError>,
    pub addresses: Vec<String>,
    pub fresh_address: Option<String>,
}

impl FakeAccount {
    pub fn new(id: &str, keys: AccountKeys) -> Self {
        Self {
            id: id.to_string(),
            keys,
            balance: Mutex::new(None),
            refresh_script: Mutex::new(VecDeque::new()),
            refresh_count: Mutex::new(0),
            transactions: Ok(Vec::new()),
            addresses: Vec::new(),
            fresh_address: None,
        }
    }

    pub fn receive_list(id: &str, address: &str) -> Self {
        Self::new(
            id,
            AccountKeys {
                receive_keys: Some(vec![key_entry(address)]),
                account_key: None,
            },
        )
    }

    pub fn single_key(id: &str, address: &str) -> Self {
        Self::new(
            id,
            AccountKeys {
                receive_keys: None,
                account_key: Some(key_entry(address)),
            },
        )
    }

    pub fn with_balance(self, confirmed: i64, unconfirmed: i64) -> Self {
        *self.balance.lock().unwrap() = Some(Balance::new(confirmed, unconfirmed));
        self
    }

    pub fn with_refreshes(self, script: Vec<Result<Balance, SdkError>>) -> Self {
        *self.refresh_script.lock().unwrap() = script.into();
        self
    }

    pub fn refreshes(&self) -> u32 {
        *self.refresh_count.lock().unwrap()
    }
}

#[async_trait]
impl SdkAccount for FakeAccount {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn keys(&self) -> AccountKeys {
        self.keys.clone()
    }

    fn balance(&self) -> Option<Balance> {
        *self.balance.lock().unwrap()
    }

    async fn refresh(&self) -> Result<(), SdkError> {
        *self.refresh_count.lock().unwrap() += 1;
        let next = self.refresh_script.lock().unwrap().pop_front();
        match next {
            Some(Ok(balance)) => {
                *self.balance.lock().unwrap() = Some(balance);
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => Ok(()),
        }
    }

    async fn get_transactions(&self) -> Result<Vec<RawTransaction>, SdkError> {
        self.transactions.clone()
    }

    fn addresses(&self) -> Vec<String> {
        self.addresses.clone()
    }

    fn new_address(&self) -> Option<String> {
        self.fresh_address.clone()
    }
}

// --- Transaction builder ---

pub struct FakeBuilder {
    log: CallLog,
    populate_error: Option<SdkError>,
}

#[async_trait]
impl TransactionBuilder for FakeBuilder {
    fn on_network(&mut self, network: Network) {
        self.log.lock().unwrap().push(format!("on_network:{}", network));
    }

    fn send_to(&mut self, address: &str, amount: u64) {
        self.log
            .lock()
            .unwrap()
            .push(format!("send_to:{}:{}", address, amount));
    }

    async fn populate(&mut self) -> Result<(), SdkError> {
        self.log.lock().unwrap().push("populate".to_string());
        match self.populate_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn sign(&mut self) -> Result<(), SdkError> {
        self.log.lock().unwrap().push("sign".to_string());
        Ok(())
    }

    async fn build(&mut self) -> Result<SignedTransaction, SdkError> {
        self.log.lock().unwrap().push("build".to_string());
        Ok(SignedTransaction {
            hex: "0100deadbeef".to_string(),
        })
    }
}

// --- Wallet ---

pub struct FakeWallet {
    pub accounts: HashMap<String, Arc<FakeAccount>>,
    pub log: CallLog,
    pub populate_error: Option<SdkError>,
    pub broadcast_error: Option<SdkError>,
    pub initialize_error: Option<SdkError>,
    pub subscribe_error: Option<SdkError>,
    pub subscriptions: Mutex<HashMap<u64, (Vec<String>, UnboundedSender<AddressNotification>)>>,
}

impl FakeWallet {
    pub fn new(accounts: Vec<Arc<FakeAccount>>) -> Self {
        Self {
            accounts: accounts.into_iter().map(|a| (a.id.clone(), a)).collect(),
            log: CallLog::default(),
            populate_error: None,
            broadcast_error: None,
            initialize_error: None,
            subscribe_error: None,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Pushes a notification to every subscription covering `address`.
    pub fn notify(&self, address: &str, status: &str) {
        for (addresses, sink) in self.subscriptions.lock().unwrap().values() {
            if addresses.iter().any(|a| a == address) {
                let _ = sink.send(AddressNotification {
                    address: address.to_string(),
                    status: Some(status.to_string()),
                });
            }
        }
    }
}

#[async_trait]
impl SdkWallet for FakeWallet {
    async fn initialize(&self) -> Result<(), SdkError> {
        self.log.lock().unwrap().push("initialize".to_string());
        match &self.initialize_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn list_accounts(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }

    fn get_account(&self, id: &str) -> Option<Arc<dyn SdkAccount>> {
        self.accounts
            .get(id)
            .map(|account| account.clone() as Arc<dyn SdkAccount>)
    }

    fn new_transaction(&self, account: Arc<dyn SdkAccount>) -> Box<dyn TransactionBuilder> {
        self.log
            .lock()
            .unwrap()
            .push(format!("new_transaction:{}", account.id()));
        Box::new(FakeBuilder {
            log: self.log.clone(),
            populate_error: self.populate_error.clone(),
        })
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<String, SdkError> {
        self.log.lock().unwrap().push(format!("broadcast:{}", tx.hex));
        match &self.broadcast_error {
            Some(e) => Err(e.clone()),
            None => Ok("f00dfeed".repeat(8)),
        }
    }

    async fn subscribe_addresses(
        &self,
        addresses: &[String],
        sink: UnboundedSender<AddressNotification>,
    ) -> Result<u64, SdkError> {
        if let Some(e) = &self.subscribe_error {
            return Err(e.clone());
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let id = subscriptions.len() as u64 + 1;
        subscriptions.insert(id, (addresses.to_vec(), sink));
        Ok(id)
    }

    async fn unsubscribe_addresses(&self, subscription_id: u64) -> Result<(), SdkError> {
        self.subscriptions.lock().unwrap().remove(&subscription_id);
        Ok(())
    }
}

// --- SDK ---

fn prefix_validator(address: &str, network: Network) -> bool {
    let prefix = network.address_prefix();
    address.starts_with(prefix) && address.len() > prefix.len()
}

type AccountsFn = dyn Fn(&str, Network) -> Vec<Arc<FakeAccount>> + Send + Sync;
type WalletHook = dyn Fn(&mut FakeWallet) + Send + Sync;

pub struct FakeSdk {
    accounts: Box<AccountsFn>,
    configure_wallet: Box<WalletHook>,
    pub opened: Mutex<Vec<Arc<FakeWallet>>>,
    pub open_error: Option<SdkError>,
    /// `None` makes `is_valid_address` report the SDK as unavailable.
    pub validator: Option<fn(&str, Network) -> bool>,
    /// Network whose address check errors even when `validator` is set.
    pub validator_fails_on: Option<Network>,
}

impl FakeSdk {
    /// Account "0" with a receive list whose address derives from the mnemonic.
    pub fn deterministic() -> Self {
        Self::with_accounts(|mnemonic, network| {
            vec![Arc::new(
                FakeAccount::receive_list("0", &derive_address(mnemonic, network)).with_balance(0, 0),
            )]
        })
    }

    pub fn with_accounts<F>(accounts: F) -> Self
    where
        F: Fn(&str, Network) -> Vec<Arc<FakeAccount>> + Send + Sync + 'static,
    {
        Self {
            accounts: Box::new(accounts),
            configure_wallet: Box::new(|_| {}),
            opened: Mutex::new(Vec::new()),
            open_error: None,
            validator: Some(prefix_validator as fn(&str, Network) -> bool),
            validator_fails_on: None,
        }
    }

    pub fn configure_wallet<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut FakeWallet) + Send + Sync + 'static,
    {
        self.configure_wallet = Box::new(hook);
        self
    }

    pub fn last_wallet(&self) -> Arc<FakeWallet> {
        self.opened.lock().unwrap().last().cloned().expect("no wallet opened")
    }
}

#[async_trait]
impl WalletSdk for FakeSdk {
    async fn open_wallet(
        &self,
        mnemonic: &SecretString,
        network: Network,
    ) -> Result<Arc<dyn SdkWallet>, SdkError> {
        if let Some(e) = &self.open_error {
            return Err(e.clone());
        }
        let mut wallet = FakeWallet::new((self.accounts)(mnemonic.expose_secret(), network));
        (self.configure_wallet)(&mut wallet);
        let wallet = Arc::new(wallet);
        self.opened.lock().unwrap().push(wallet.clone());
        Ok(wallet)
    }

    fn is_valid_address(&self, address: &str, network: Network) -> Result<bool, SdkError> {
        if self.validator_fails_on == Some(network) {
            return Err(SdkError::Unavailable(format!("no {} checker", network)));
        }
        match self.validator {
            Some(check) => Ok(check(address, network)),
            None => Err(SdkError::Unavailable("validator not loaded".to_string())),
        }
    }
}

// --- Provider ---

#[derive(Default)]
pub struct FakeProvider {
    pub log: CallLog,
    pub fail_connect: bool,
    pub balance: Option<ProviderBalance>,
    pub utxos: Option<Vec<Utxo>>,
}

#[async_trait]
impl NetworkProvider for FakeProvider {
    async fn connect(&self, network: Network) -> Result<(), SdkError> {
        self.log.lock().unwrap().push(format!("connect:{}", network));
        if self.fail_connect {
            return Err(SdkError::Connection("connection refused".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SdkError> {
        self.log.lock().unwrap().push("disconnect".to_string());
        Ok(())
    }

    async fn get_balance(&self, address: &str) -> Result<ProviderBalance, SdkError> {
        self.log.lock().unwrap().push(format!("get_balance:{}", address));
        self.balance
            .ok_or_else(|| SdkError::Other("balance lookup failed".to_string()))
    }

    async fn get_utxos(&self, address: &str) -> Result<Vec<Utxo>, SdkError> {
        self.log.lock().unwrap().push(format!("get_utxos:{}", address));
        self.utxos
            .clone()
            .ok_or_else(|| SdkError::Other("listunspent failed".to_string()))
    }
}

pub struct FakeProviderFactory(pub Arc<FakeProvider>);

impl ProviderFactory for FakeProviderFactory {
    fn provider(&self, _network: Network) -> Arc<dyn NetworkProvider> {
        self.0.clone()
    }
}
