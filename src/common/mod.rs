//! Common types and shared interfaces
//!
//! This module contains the record types and seams used across the service.

pub mod types;
pub mod traits;
