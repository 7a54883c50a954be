//! Bet settlement
//!
//! A bet is folded into the jackpot's pool and a single uniform draw decides
//! whether the pool is won. Load, bet insert, optional win insert and the
//! jackpot update all happen in one store transaction.

use crate::{
    common::{
        traits::{ThreadRngDraw, WinDraw},
        types::{Bet, Win},
    },
    errors::{JackpotError, JackpotResult},
    storage::JackpotStore,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub const WIN_MESSAGE: &str = "Congratulations! You won!";
pub const LOSS_MESSAGE: &str = "Better luck next time!";

/// Result of settling one bet
#[derive(Clone, Debug, PartialEq)]
pub struct BetOutcome {
    pub won: bool,
    /// Pool paid out, zero on a loss
    pub win_amount: Decimal,
    /// Pool size including this bet. On a win this is the amount won, not the
    /// post-reset zero.
    pub new_jackpot_size: Decimal,
    pub message: String,
}

#[derive(Clone)]
pub struct BetService {
    store: JackpotStore,
    draw: Arc<dyn WinDraw>,
}

impl BetService {
    pub fn new(store: JackpotStore) -> Self {
        Self::with_draw(store, Arc::new(ThreadRngDraw))
    }

    pub fn with_draw(store: JackpotStore, draw: Arc<dyn WinDraw>) -> Self {
        Self { store, draw }
    }

    /// Place a bet and settle it.
    ///
    /// Fails with `InvalidBetAmount` for a missing or non-positive amount and
    /// `JackpotNotFound` for an unknown jackpot; neither case writes anything.
    pub fn settle(
        &self,
        jackpot_id: Uuid,
        player_alias: &str,
        bet_amount: Option<Decimal>,
    ) -> JackpotResult<BetOutcome> {
        let bet_amount = match bet_amount {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => return Err(JackpotError::InvalidBetAmount("Bet amount must be positive".to_string())),
        };
        if player_alias.trim().is_empty() {
            return Err(JackpotError::InvalidRequest("playerAlias is required".to_string()));
        }

        let outcome = self.store.transaction(|txn| {
            let mut jackpot = txn
                .lock_jackpot(jackpot_id)?
                .ok_or(JackpotError::JackpotNotFound(jackpot_id))?;

            txn.put_bet(&Bet::new(jackpot_id, player_alias.to_string(), bet_amount))?;

            let new_size = jackpot.add_to_pool(bet_amount);
            let won = self.draw.draw() < jackpot.win_probability;

            let outcome = if won {
                let now = Utc::now();
                txn.put_win(&Win::new(jackpot_id, player_alias.to_string(), new_size, now))?;
                jackpot.reset_after_win(now);
                BetOutcome {
                    won: true,
                    win_amount: new_size,
                    new_jackpot_size: new_size,
                    message: WIN_MESSAGE.to_string(),
                }
            } else {
                BetOutcome {
                    won: false,
                    win_amount: Decimal::ZERO,
                    new_jackpot_size: new_size,
                    message: LOSS_MESSAGE.to_string(),
                }
            };

            txn.put_jackpot(&jackpot)?;
            Ok(outcome)
        })?;

        if outcome.won {
            tracing::info!(
                jackpot_id = %jackpot_id,
                player_alias = %player_alias,
                win_amount = %outcome.win_amount,
                "Jackpot won"
            );
        } else {
            tracing::debug!(
                jackpot_id = %jackpot_id,
                bet_amount = %bet_amount,
                new_jackpot_size = %outcome.new_jackpot_size,
                "Bet settled without a win"
            );
        }

        Ok(outcome)
    }
}
