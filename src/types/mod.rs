//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identity and state types
//! - `error`: Error types for the bank server

pub mod account;
pub mod error;

pub use account::{amount_is_valid, Account, AccountId, ConnectionId, Pin};
pub use error::BankError;
