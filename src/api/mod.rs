// src/api/mod.rs

pub mod balance;
pub mod health;
pub mod utxos;

use axum::{Json, Router, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;
use crate::blockchain::models::{Network, SdkError, Utxo};

/// Query string shared by the wallet endpoints.
#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub address: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/wallet/balance", get(balance::get_balance_handler))
        .route("/api/wallet/utxos", get(utxos::get_utxos_handler))
        .with_state(state)
}

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: error.into(),
            message: None,
        }),
    )
}

fn internal_error(error: &str, cause: &SdkError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: error.to_string(),
            message: Some(cause.to_string()),
        }),
    )
}

/// Address and network from the query, defaulting the network from config.
fn resolve_query(state: &AppState, query: WalletQuery) -> Result<(String, Network), ApiError> {
    let address = query
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| bad_request("Address is required"))?;
    let network = match query.network {
        Some(raw) => raw.parse::<Network>().map_err(bad_request)?,
        None => state.config.default_network,
    };
    Ok((address.trim().to_string(), network))
}

/// One provider per request: connect, list, disconnect.
async fn fetch_utxos(state: &AppState, address: &str, network: Network) -> Result<Vec<Utxo>, SdkError> {
    let provider = state.providers.provider(network);
    provider.connect(network).await?;
    let utxos = provider.get_utxos(address).await;
    if let Err(e) = provider.disconnect().await {
        warn!("Provider disconnect failed: {}", e);
    }
    utxos
}
