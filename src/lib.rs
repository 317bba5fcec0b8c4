// src/lib.rs

use std::sync::Arc;

pub mod api;
pub mod blockchain;
pub mod config;
pub mod utils;

/// Shared state of the HTTP boundary.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub providers: Arc<dyn blockchain::sdk::ProviderFactory>,
}
