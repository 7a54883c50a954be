//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Jackpot management
        .route("/jackpots", post(create_jackpot_handler).get(list_jackpots_handler))
        .route("/jackpots/:id", get(get_jackpot_handler))
        // Settlement
        .route("/bets", post(place_bet_handler))
        // Win ledger
        .route("/wins", get(wins_handler))
        .with_state(state)
}
