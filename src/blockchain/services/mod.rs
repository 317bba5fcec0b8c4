// src/blockchain/services/mod.rs

pub mod balance;
pub mod history;
pub mod transactions;
pub mod wallet;
