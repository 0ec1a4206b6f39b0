//! Core business logic module
//!
//! This module contains the shared server-side state:
//! - `account_store` - Account records and balance mutation logic
//! - `session_registry` - The at-most-one-session-per-account invariant

pub mod account_store;
pub mod session_registry;

pub use account_store::AccountStore;
pub use session_registry::SessionRegistry;
