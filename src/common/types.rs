//! Record types persisted by the jackpot store
//!
//! Monetary amounts are `Decimal` everywhere so repeated additions never
//! drift.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named pool with a fixed win probability and an accumulating size
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Jackpot {
    pub id: Uuid,
    pub name: String,
    /// Probability in [0.0, 1.0] that a single bet wins the pool
    pub win_probability: f64,
    pub current_size: Decimal,
    pub win_count: u64,
    pub last_win_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Jackpot {
    /// Create an empty jackpot. Callers validate the inputs first.
    pub fn new(name: String, win_probability: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            win_probability,
            current_size: Decimal::ZERO,
            win_count: 0,
            last_win_timestamp: None,
            created_at: Utc::now(),
        }
    }

    /// Fold a bet amount into the pool and return the new pool size
    pub fn add_to_pool(&mut self, amount: Decimal) -> Decimal {
        self.current_size += amount;
        self.current_size
    }

    /// Empty the pool after a win
    pub fn reset_after_win(&mut self, at: DateTime<Utc>) {
        self.current_size = Decimal::ZERO;
        self.count_win(at);
    }

    /// Count a win against this jackpot without touching the pool.
    /// `last_win_timestamp` only moves forward.
    pub fn count_win(&mut self, at: DateTime<Utc>) {
        self.win_count += 1;
        self.last_win_timestamp = Some(self.last_win_timestamp.map_or(at, |last| last.max(at)));
    }
}

/// Immutable audit record of one wager
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bet {
    pub id: Uuid,
    pub jackpot_id: Uuid,
    pub player_alias: String,
    pub bet_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Bet {
    pub fn new(jackpot_id: Uuid, player_alias: String, bet_amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            jackpot_id,
            player_alias,
            bet_amount,
            created_at: Utc::now(),
        }
    }
}

/// Ledger entry written when a bet wins the pool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Win {
    pub id: Uuid,
    pub jackpot_id: Uuid,
    pub player_alias: String,
    pub win_amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Win {
    pub fn new(
        jackpot_id: Uuid,
        player_alias: String,
        win_amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            jackpot_id,
            player_alias,
            win_amount,
            timestamp,
        }
    }
}

/// Conjunctive filter for win ledger queries. `None` matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WinFilter {
    pub player_alias: Option<String>,
    pub jackpot_id: Option<Uuid>,
}

impl WinFilter {
    pub fn matches(&self, win: &Win) -> bool {
        let alias_ok = self
            .player_alias
            .as_deref()
            .map_or(true, |alias| win.player_alias == alias);
        let jackpot_ok = self.jackpot_id.map_or(true, |id| win.jackpot_id == id);
        alias_ok && jackpot_ok
    }
}

/// Normalized page window: skip `offset` records, return at most `limit`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// Coerce raw query values: non-positive limits fall back to
    /// `default_limit`, negative offsets become zero.
    pub fn normalize(limit: Option<i64>, offset: Option<i64>, default_limit: usize) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l as usize,
            _ => default_limit,
        };
        let offset = match offset {
            Some(o) if o > 0 => o as usize,
            _ => 0,
        };
        Self { limit, offset }
    }
}
