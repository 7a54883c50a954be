//! Jackpot HTTP API
//!
//! JSON endpoints for jackpot management, betting and win history.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{build_app, ApiServer};
