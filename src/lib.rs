//! Jackpot - pooled jackpots with probabilistic bet settlement
//!
//! Clients create jackpots with a fixed win probability, place bets that grow
//! the pool, and browse the history of wins. State lives in an embedded
//! RocksDB store; every settlement is a single store transaction.

pub mod api;
pub mod common;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;

pub use common::types::{Bet, Jackpot, Win};
pub use config::JackpotConfig;
pub use errors::{JackpotError, JackpotResult};
pub use storage::JackpotStore;
