use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use tracing::{error, info};

use super::{ApiError, WalletQuery, fetch_utxos, internal_error, resolve_query};
use crate::AppState;
use crate::blockchain::models::Network;

// Defines the structure for the JSON output returned by our API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOutput {
    pub address: String,
    /// Smallest units, as a string so large values survive JSON consumers.
    pub balance: String,
    pub utxo_count: usize,
    pub network: Network,
}

// The handler function for the GET /api/wallet/balance endpoint.
// The balance is the sum of the address's unspent outputs.
pub async fn get_balance_handler(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<BalanceOutput>, ApiError> {
    let (address, network) = resolve_query(&state, query)?;
    info!("Received balance request for {} on {}", address, network);

    match fetch_utxos(&state, &address, network).await {
        Ok(utxos) => {
            let balance: u64 = utxos.iter().map(|utxo| utxo.satoshis).sum();
            Ok(Json(BalanceOutput {
                address,
                balance: balance.to_string(),
                utxo_count: utxos.len(),
                network,
            }))
        }
        Err(e) => {
            error!("Failed to get balance for {}: {}", address, e);
            Err(internal_error("Failed to fetch balance", &e))
        }
    }
}
