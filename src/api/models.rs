//! API Request and Response Models
//!
//! JSON field names are camelCase. Money is serialized as a decimal string;
//! requests accept either a number or a string, and numbers are read from
//! their literal digits so no amount is rounded on the way in.

use crate::{
    common::types::{Jackpot, Win},
    errors::{JackpotError, JackpotResult},
    services::BetOutcome,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// POST /jackpots body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJackpotRequest {
    pub name: Option<String>,
    pub win_probability: Option<f64>,
}

impl CreateJackpotRequest {
    /// Field checks in declaration order; only the first failure is reported
    pub fn validate(self) -> JackpotResult<(String, f64)> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(invalid_definition("name", "name is required")),
        };
        let win_probability = match self.win_probability {
            Some(p) if p.is_finite() => p,
            _ => return Err(invalid_definition("winProbability", "winProbability is required")),
        };
        if win_probability < 0.0 {
            return Err(invalid_definition("winProbability", "winProbability must be >= 0.0"));
        }
        if win_probability > 1.0 {
            return Err(invalid_definition("winProbability", "winProbability must be <= 1.0"));
        }
        Ok((name, win_probability))
    }
}

fn invalid_definition(field: &str, message: &str) -> JackpotError {
    JackpotError::InvalidJackpotDefinition(format!("{}: {}", field, message))
}

/// POST /bets body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRequest {
    pub jackpot_id: Option<Uuid>,
    pub player_alias: Option<String>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub bet_amount: Option<Decimal>,
}

/// A bet request whose fields passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBet {
    pub jackpot_id: Uuid,
    pub player_alias: String,
    pub bet_amount: Decimal,
}

impl BetRequest {
    /// Field checks in declaration order; only the first failure is reported
    pub fn validate(self) -> JackpotResult<ValidBet> {
        let jackpot_id = self.jackpot_id.ok_or_else(|| {
            JackpotError::InvalidRequest("jackpotId: jackpotId is required".to_string())
        })?;
        let player_alias = match self.player_alias {
            Some(alias) if !alias.trim().is_empty() => alias,
            _ => {
                return Err(JackpotError::InvalidRequest(
                    "playerAlias: playerAlias is required".to_string(),
                ))
            }
        };
        let bet_amount = match self.bet_amount {
            Some(amount) if amount > Decimal::ZERO => amount,
            Some(_) => {
                return Err(JackpotError::InvalidBetAmount(
                    "betAmount: betAmount must be > 0".to_string(),
                ))
            }
            None => {
                return Err(JackpotError::InvalidBetAmount(
                    "betAmount: betAmount is required".to_string(),
                ))
            }
        };
        Ok(ValidBet { jackpot_id, player_alias, bet_amount })
    }
}

/// GET /wins query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub player_alias: Option<String>,
    pub jackpot_id: Option<Uuid>,
}

/// Jackpot representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JackpotResponse {
    pub id: Uuid,
    pub name: String,
    pub win_probability: f64,
    pub current_size: Decimal,
    pub win_count: u64,
    pub last_win_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Jackpot> for JackpotResponse {
    fn from(jackpot: Jackpot) -> Self {
        Self {
            id: jackpot.id,
            name: jackpot.name,
            win_probability: jackpot.win_probability,
            current_size: jackpot.current_size,
            win_count: jackpot.win_count,
            last_win_timestamp: jackpot.last_win_timestamp,
            created_at: jackpot.created_at,
        }
    }
}

/// Settlement result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetResponse {
    pub won: bool,
    pub win_amount: Decimal,
    pub new_jackpot_size: Decimal,
    pub message: String,
}

impl From<BetOutcome> for BetResponse {
    fn from(outcome: BetOutcome) -> Self {
        Self {
            won: outcome.won,
            win_amount: outcome.win_amount,
            new_jackpot_size: outcome.new_jackpot_size,
            message: outcome.message,
        }
    }
}

/// Win ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinResponse {
    pub timestamp: DateTime<Utc>,
    pub player_alias: String,
    pub win_amount: Decimal,
}

impl From<Win> for WinResponse {
    fn from(win: Win) -> Self {
        Self {
            timestamp: win.timestamp,
            player_alias: win.player_alias,
            win_amount: win.win_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_request_reports_first_failing_field() {
        let request = BetRequest::default();

        let err = request.validate().unwrap_err();

        assert_eq!(err.to_string(), "jackpotId: jackpotId is required");
    }

    #[test]
    fn test_bet_amount_errors() {
        let base = BetRequest {
            jackpot_id: Some(Uuid::new_v4()),
            player_alias: Some("alice".to_string()),
            bet_amount: None,
        };

        let missing = base.clone().validate().unwrap_err();
        assert!(matches!(missing, JackpotError::InvalidBetAmount(_)));

        let zero = BetRequest { bet_amount: Some(Decimal::ZERO), ..base }.validate().unwrap_err();
        assert_eq!(zero.to_string(), "betAmount: betAmount must be > 0");
    }

    #[test]
    fn test_bet_amount_accepts_number_or_string() {
        let from_number: BetRequest =
            serde_json::from_str(r#"{"jackpotId":null,"playerAlias":"a","betAmount":50.25}"#).unwrap();
        let from_string: BetRequest =
            serde_json::from_str(r#"{"playerAlias":"a","betAmount":"50.25"}"#).unwrap();

        assert_eq!(from_number.bet_amount, Some("50.25".parse().unwrap()));
        assert_eq!(from_string.bet_amount, from_number.bet_amount);
    }

    #[test]
    fn test_bet_amount_number_parsed_exactly() {
        let large: BetRequest = serde_json::from_str(r#"{"betAmount":12345678901234567.89}"#).unwrap();
        let fine: BetRequest = serde_json::from_str(r#"{"betAmount":0.1000000000000000055}"#).unwrap();
        let absent: BetRequest = serde_json::from_str(r#"{"playerAlias":"a"}"#).unwrap();
        let null: BetRequest = serde_json::from_str(r#"{"betAmount":null}"#).unwrap();

        assert_eq!(large.bet_amount, Some("12345678901234567.89".parse().unwrap()));
        assert_eq!(fine.bet_amount, Some("0.1000000000000000055".parse().unwrap()));
        assert_eq!(absent.bet_amount, None);
        assert_eq!(null.bet_amount, None);
    }

    #[test]
    fn test_create_request_validation() {
        let blank = CreateJackpotRequest { name: Some(" ".to_string()), win_probability: Some(0.5) };
        assert_eq!(blank.validate().unwrap_err().to_string(), "name: name is required");

        let too_high = CreateJackpotRequest { name: Some("Big".to_string()), win_probability: Some(1.5) };
        assert_eq!(too_high.validate().unwrap_err().to_string(), "winProbability: winProbability must be <= 1.0");

        let ok = CreateJackpotRequest { name: Some("Big".to_string()), win_probability: Some(1.0) };
        assert_eq!(ok.validate().unwrap(), ("Big".to_string(), 1.0));
    }
}
