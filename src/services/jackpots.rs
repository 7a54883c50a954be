//! Jackpot management: create, list, look up

use crate::{
    common::types::{Bet, Jackpot},
    errors::{JackpotError, JackpotResult},
    storage::JackpotStore,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct JackpotService {
    store: JackpotStore,
}

impl JackpotService {
    pub fn new(store: JackpotStore) -> Self {
        Self { store }
    }

    /// Create an empty jackpot.
    ///
    /// The name must contain a non-whitespace character and the probability
    /// must lie in [0.0, 1.0]. The pool always starts at zero with no wins.
    pub fn create(&self, name: &str, win_probability: f64) -> JackpotResult<Jackpot> {
        if name.trim().is_empty() {
            return Err(JackpotError::InvalidJackpotDefinition("name is required".to_string()));
        }
        if !win_probability.is_finite() || win_probability < 0.0 {
            return Err(JackpotError::InvalidJackpotDefinition(
                "winProbability must be >= 0.0".to_string(),
            ));
        }
        if win_probability > 1.0 {
            return Err(JackpotError::InvalidJackpotDefinition(
                "winProbability must be <= 1.0".to_string(),
            ));
        }

        let jackpot = Jackpot::new(name.to_string(), win_probability);
        self.store.insert_jackpot(&jackpot)?;

        tracing::info!(
            jackpot_id = %jackpot.id,
            name = %jackpot.name,
            win_probability = jackpot.win_probability,
            "Jackpot created"
        );
        Ok(jackpot)
    }

    pub fn list_all(&self) -> JackpotResult<Vec<Jackpot>> {
        self.store.load_jackpots()
    }

    pub fn get_by_id(&self, id: Uuid) -> JackpotResult<Jackpot> {
        self.store
            .load_jackpot(id)?
            .ok_or(JackpotError::JackpotNotFound(id))
    }

    /// Bet audit trail of one jackpot, oldest first
    pub fn bets_for(&self, id: Uuid) -> JackpotResult<Vec<Bet>> {
        self.get_by_id(id)?;
        self.store.load_bets_for_jackpot(id)
    }
}
