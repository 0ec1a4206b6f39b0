//! Wire protocol for the bank server
//!
//! This module centralizes all wire format concerns:
//! - Parsing `##`-delimited request frames into typed [`Command`]s
//! - Serializing typed [`Reply`]s back to wire responses
//!
//! All functions are pure (no I/O) for easy testing. Framing itself (one
//! newline-terminated line per frame) is handled by the transport codec in
//! the server module.
//!
//! # Frame format
//!
//! A frame is a single line of text with fields joined by `##`. The first
//! field is the command name; the remaining fields are order-significant
//! arguments, all transmitted as text:
//!
//! ```text
//! Validate##ab-12345##1234
//! Balance
//! Deposit##50
//! Withdraw##12.75
//! END
//! ```
//!
//! Extra trailing fields are ignored; legacy clients append the account
//! identifier to `END` and the money commands, and the server must never
//! trust it anyway.
//!
//! # Result codes
//!
//! Replies to `Deposit`, `Withdraw`, and `Validate` are single result-code
//! digits; `Balance` replies with the balance as decimal text. The closed
//! set of codes is documented on [`Reply`].

pub mod command;
pub mod reply;

pub use command::{parse_frame, Command};
pub use reply::Reply;

/// The two-character field delimiter used by the wire protocol
pub const FIELD_DELIMITER: &str = "##";
