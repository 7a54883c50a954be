//! Request Handlers
//!
//! Store access is blocking (RocksDB, and settlement may wait on a row lock),
//! so every service call runs on the blocking pool.

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
};
use crate::{
    errors::{JackpotError, JackpotResult},
    services::{BetService, JackpotService, WinLedger},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state
pub struct AppState {
    pub jackpots: JackpotService,
    pub bets: BetService,
    pub ledger: WinLedger,
}

async fn run_blocking<T, F>(request_id: &RequestId, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> JackpotResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| ApiError::from_domain(request_id.0.clone(), e)),
        Err(e) => Err(ApiError::internal_error(
            request_id.0.clone(),
            format!("Blocking task failed: {}", e),
        )),
    }
}

fn parse_jackpot_id(request_id: &RequestId, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::bad_request(request_id.0.clone(), format!("Invalid jackpot ID: '{}'", raw))
    })
}

/// Health check handler
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}

/// POST /jackpots
pub async fn create_jackpot_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateJackpotRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JackpotResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(request_id.0.clone(), e.body_text()))?;
    let (name, win_probability) = request
        .validate()
        .map_err(|e| ApiError::from_domain(request_id.0.clone(), e))?;

    let jackpots = state.jackpots.clone();
    let jackpot = run_blocking(&request_id, move || jackpots.create(&name, win_probability)).await?;

    Ok((StatusCode::CREATED, Json(jackpot.into())))
}

/// GET /jackpots
pub async fn list_jackpots_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<JackpotResponse>>, ApiError> {
    let jackpots = state.jackpots.clone();
    let all = run_blocking(&request_id, move || jackpots.list_all()).await?;

    Ok(Json(all.into_iter().map(JackpotResponse::from).collect()))
}

/// GET /jackpots/{id}
pub async fn get_jackpot_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<JackpotResponse>, ApiError> {
    let id = parse_jackpot_id(&request_id, &raw_id)?;

    let jackpots = state.jackpots.clone();
    let jackpot = run_blocking(&request_id, move || jackpots.get_by_id(id)).await?;

    Ok(Json(jackpot.into()))
}

/// POST /bets
///
/// An unknown jackpot is the caller's mistake here, so it is a 400 rather
/// than the 404 of the jackpot lookup endpoint.
pub async fn place_bet_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BetRequest>, JsonRejection>,
) -> Result<Json<BetResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(request_id.0.clone(), e.body_text()))?;
    let bet = request
        .validate()
        .map_err(|e| ApiError::from_domain(request_id.0.clone(), e))?;

    let bets = state.bets.clone();
    let settled = tokio::task::spawn_blocking(move || {
        bets.settle(bet.jackpot_id, &bet.player_alias, Some(bet.bet_amount))
    })
    .await;

    let outcome = match settled {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err @ JackpotError::JackpotNotFound(_))) => {
            return Err(ApiError::bad_request(request_id.0, err.to_string()))
        }
        Ok(Err(err)) => return Err(ApiError::from_domain(request_id.0, err)),
        Err(e) => {
            return Err(ApiError::internal_error(
                request_id.0,
                format!("Blocking task failed: {}", e),
            ))
        }
    };

    Ok(Json(outcome.into()))
}

/// GET /wins?limit={n}&offset={n}&playerAlias={alias}&jackpotId={id}
pub async fn wins_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<WinsQuery>, QueryRejection>,
) -> Result<Json<Vec<WinResponse>>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::bad_request(request_id.0.clone(), e.body_text()))?;
    let player_alias = params.player_alias.filter(|alias| !alias.is_empty());

    let ledger = state.ledger.clone();
    let wins = run_blocking(&request_id, move || {
        ledger.query(params.limit, params.offset, player_alias, params.jackpot_id)
    })
    .await?;

    Ok(Json(wins.into_iter().map(WinResponse::from).collect()))
}
