// src/blockchain/mod.rs

// Facade over the services, one method per wallet operation.
pub mod client;
// Rostrum adapter for the network provider seam.
pub mod rostrum;
pub mod mnemonic;
// Data model and error types.
pub mod models;
pub mod sdk;
pub mod session;

pub mod services;
