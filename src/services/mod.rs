//! Service layer
//!
//! Each service owns a handle to the shared [`JackpotStore`] and is wired
//! explicitly by the API server.
//!
//! [`JackpotStore`]: crate::storage::JackpotStore

pub mod jackpots;
pub mod ledger;
pub mod settlement;

pub use jackpots::JackpotService;
pub use ledger::WinLedger;
pub use settlement::{BetOutcome, BetService};
