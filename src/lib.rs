//! Rust Bank Server Library
//! # Overview
//!
//! This library provides a minimal in-memory banking backend: a TCP server
//! exchanges `##`-delimited text commands with ATM-style client sessions to
//! validate logins, report balances, and apply deposits and withdrawals.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (AccountId, Pin, Account, BankError)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Shared server-side state:
//!   - [`core::account_store`] - Account records and balance mutation
//!   - [`core::session_registry`] - At-most-one-session-per-account
//! - [`protocol`] - Wire frame parsing and reply serialization
//! - [`server`] - The async listener loop and per-connection handler
//! - [`io`] - Account-file ingestion at startup
//!
//! # Protocol
//!
//! Each frame is one newline-terminated line with fields joined by `##`:
//! `Validate` logs a connection into an account (4-digit PIN compare),
//! after which `Balance`, `Deposit`, and `Withdraw` operate on the bound
//! account; `END` closes the session. Replies are single result-code
//! digits (`0` ok, `1` failed, `2` rejected, `3` malformed) except for
//! `Balance`, which answers with the balance as decimal text.
//!
//! # Invariants
//!
//! - A given account has at most one active session server-wide.
//! - Balances are never negative and always carry at most two fractional
//!   digits; every mutation rounds to two decimal places.
//! - Session bindings are released on every disconnect path.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod protocol;
pub mod server;
pub mod types;

pub use core::{AccountStore, SessionRegistry};
pub use io::load_accounts;
pub use protocol::{Command, Reply};
pub use server::{run, ServerState};
pub use types::{Account, AccountId, BankError, ConnectionId, Pin};
