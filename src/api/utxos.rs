use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use tracing::{error, info};

use super::{ApiError, WalletQuery, fetch_utxos, internal_error, resolve_query};
use crate::AppState;
use crate::blockchain::models::Network;

#[derive(Debug, Serialize)]
pub struct UtxoOutput {
    pub txid: String,
    pub vout: u32,
    pub satoshis: String,
}

#[derive(Debug, Serialize)]
pub struct UtxosOutput {
    pub address: String,
    pub utxos: Vec<UtxoOutput>,
    pub count: usize,
    pub network: Network,
}

/// Handler for the GET /api/wallet/utxos endpoint.
pub async fn get_utxos_handler(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<UtxosOutput>, ApiError> {
    let (address, network) = resolve_query(&state, query)?;
    info!("Received UTXO request for {} on {}", address, network);

    match fetch_utxos(&state, &address, network).await {
        Ok(utxos) => {
            let utxos: Vec<UtxoOutput> = utxos
                .into_iter()
                .map(|utxo| UtxoOutput {
                    txid: utxo.txid,
                    vout: utxo.vout,
                    satoshis: utxo.satoshis.to_string(),
                })
                .collect();
            Ok(Json(UtxosOutput {
                address,
                count: utxos.len(),
                utxos,
                network,
            }))
        }
        Err(e) => {
            error!("Failed to get UTXOs for {}: {}", address, e);
            Err(internal_error("Failed to fetch UTXOs", &e))
        }
    }
}
