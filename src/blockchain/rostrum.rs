// src/blockchain/rostrum.rs

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::blockchain::models::{Balance, Network, ProviderBalance, SdkError, Utxo};
use crate::blockchain::sdk::{NetworkProvider, ProviderFactory};

const CLIENT_NAME: &str = concat!("nexa-wallet-rs/", env!("CARGO_PKG_VERSION"));
const PROTOCOL_VERSION: &str = "1.4";

/// `host:port` of the Rostrum TCP endpoint for each network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RostrumEndpoints {
    pub mainnet: String,
    pub testnet: String,
}

impl RostrumEndpoints {
    pub fn for_network(&self, network: Network) -> &str {
        let endpoint = match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        };
        endpoint.trim_start_matches("tcp://")
    }
}

// --- Helper Structs for Deserialization ---

#[derive(Deserialize, Debug)]
struct RpcResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize, Debug)]
struct RpcError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

#[derive(Deserialize, Debug)]
struct UnspentEntry {
    tx_hash: String,
    tx_pos: u32,
    value: u64,
    #[serde(default)]
    height: u64,
}

struct RostrumConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RostrumConnection {
    async fn open(endpoint: &str) -> Result<Self, SdkError> {
        let stream = TcpStream::connect(endpoint)
            .await
            .map_err(|e| SdkError::Connection(format!("{}: {}", endpoint, e)))?;
        let (read, write) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read),
            writer: write,
        })
    }

    /// Writes one request line and reads until the response with `id`.
    /// Subscription notifications carry no id and are skipped.
    async fn call(&mut self, id: u64, payload: &Value) -> Result<Value, SdkError> {
        let mut line = payload.to_string();
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SdkError::Connection(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| SdkError::Connection(e.to_string()))?;

        loop {
            let mut buf = String::new();
            let read = self
                .reader
                .read_line(&mut buf)
                .await
                .map_err(|e| SdkError::Connection(e.to_string()))?;
            if read == 0 {
                return Err(SdkError::Connection("connection closed by server".to_string()));
            }

            let response: RpcResponse = serde_json::from_str(buf.trim())
                .map_err(|e| SdkError::Other(format!("malformed Rostrum response: {}", e)))?;
            if response.id != Some(id) {
                debug!("Skipping Rostrum message without matching id: {}", buf.trim());
                continue;
            }
            if let Some(error) = response.error {
                debug!("Rostrum error code {:?}: {}", error.code, error.message);
                return Err(SdkError::from_message(error.message));
            }
            return Ok(response.result.unwrap_or(Value::Null));
        }
    }
}

/// Electrum-protocol client for a Rostrum server: one TCP connection,
/// newline-delimited JSON-RPC, one request in flight at a time.
pub struct RostrumProvider {
    endpoints: RostrumEndpoints,
    timeout: Duration,
    connection: Mutex<Option<RostrumConnection>>,
    next_id: AtomicU64,
}

impl RostrumProvider {
    pub fn new(endpoints: RostrumEndpoints, timeout: Duration) -> Self {
        Self {
            endpoints,
            timeout,
            connection: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, SdkError> {
        let mut guard = self.connection.lock().await;
        let connection = guard
            .as_mut()
            .ok_or_else(|| SdkError::Connection("Rostrum provider is not connected".to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });
        debug!("Sending Rostrum request: {}", payload);

        let result = match tokio::time::timeout(self.timeout, connection.call(id, &payload)).await {
            Ok(result) => result,
            Err(_) => Err(SdkError::Connection(format!(
                "{} timed out after {:?}",
                method, self.timeout
            ))),
        };

        // A timed-out or broken stream may hold a stale reply; never reuse it.
        if let Err(SdkError::Connection(e)) = &result {
            warn!("Dropping Rostrum connection after {}: {}", method, e);
            *guard = None;
        }
        result
    }
}

#[async_trait]
impl NetworkProvider for RostrumProvider {
    async fn connect(&self, network: Network) -> Result<(), SdkError> {
        let endpoint = self.endpoints.for_network(network);
        info!("Connecting to Rostrum at {} ({})", endpoint, network);

        let mut guard = self.connection.lock().await;
        *guard = None;

        let mut connection =
            tokio::time::timeout(self.timeout, RostrumConnection::open(endpoint))
                .await
                .map_err(|_| SdkError::Connection(format!("{}: connect timed out", endpoint)))??;

        // Only a connection that completed the handshake is kept.
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "server.version",
            "params": [CLIENT_NAME, PROTOCOL_VERSION],
            "id": id
        });
        let version = tokio::time::timeout(self.timeout, connection.call(id, &payload))
            .await
            .map_err(|_| SdkError::Connection(format!("{}: handshake timed out", endpoint)))??;
        debug!("Rostrum server version: {}", version);

        *guard = Some(connection);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SdkError> {
        if let Some(mut connection) = self.connection.lock().await.take() {
            connection
                .writer
                .shutdown()
                .await
                .map_err(|e| SdkError::Connection(e.to_string()))?;
        }
        Ok(())
    }

    async fn get_balance(&self, address: &str) -> Result<ProviderBalance, SdkError> {
        let result = self
            .request("blockchain.address.get_balance", json!([address]))
            .await?;
        parse_balance(&result)
    }

    async fn get_utxos(&self, address: &str) -> Result<Vec<Utxo>, SdkError> {
        let result = self
            .request("blockchain.address.listunspent", json!([address]))
            .await?;
        let entries: Vec<UnspentEntry> = serde_json::from_value(result)
            .map_err(|e| SdkError::Other(format!("malformed listunspent result: {}", e)))?;
        Ok(entries
            .into_iter()
            .map(|entry| Utxo {
                txid: entry.tx_hash,
                vout: entry.tx_pos,
                satoshis: entry.value,
                height: entry.height,
            })
            .collect())
    }
}

fn parse_balance(value: &Value) -> Result<ProviderBalance, SdkError> {
    match value {
        Value::Object(fields) => Ok(ProviderBalance::Split(Balance {
            confirmed: fields.get("confirmed").and_then(Value::as_i64),
            unconfirmed: fields.get("unconfirmed").and_then(Value::as_i64),
        })),
        Value::Number(n) => n
            .as_u64()
            .map(ProviderBalance::Total)
            .ok_or_else(|| SdkError::Other(format!("unexpected balance value {}", n))),
        Value::Null => Ok(ProviderBalance::Total(0)),
        other => Err(SdkError::Other(format!("unexpected balance result {}", other))),
    }
}

/// Builds a fresh [`RostrumProvider`] per request.
#[derive(Debug, Clone)]
pub struct RostrumFactory {
    endpoints: RostrumEndpoints,
    timeout: Duration,
}

impl RostrumFactory {
    pub fn new(endpoints: RostrumEndpoints, timeout: Duration) -> Self {
        Self { endpoints, timeout }
    }
}

impl ProviderFactory for RostrumFactory {
    fn provider(&self, _network: Network) -> Arc<dyn NetworkProvider> {
        Arc::new(RostrumProvider::new(self.endpoints.clone(), self.timeout))
    }
}
