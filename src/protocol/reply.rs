//! Response serialization
//!
//! One closed result-code enumeration replaces the mixed `"T"`/`"F"`/
//! `"YD"`/`"ND"` sentinels of earlier drafts of this protocol. Every
//! command answers with one of these replies; the meaning of codes `1`
//! and `2` depends on the command that was issued, as documented on the
//! variants.

use rust_decimal::Decimal;
use std::fmt;

/// Typed server response, serialized to one wire frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `0` - the command succeeded
    Ok,

    /// `1` - business failure: PIN mismatch or unknown account
    /// (`Validate`), or invalid amount (`Deposit`/`Withdraw`)
    Failed,

    /// `2` - rejected: already logged in elsewhere (`Validate`), or
    /// attempted overdraft (`Withdraw`)
    Rejected,

    /// `3` - malformed frame, missing arguments, or a command that
    /// requires a bound session on an unauthenticated connection
    Malformed,

    /// Current balance as decimal text with two fractional digits
    Balance(Decimal),

    /// Error text sent before the server closes the connection
    Error(String),
}

impl Reply {
    /// Serialize this reply to its wire form (without the line terminator)
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("0"),
            Reply::Failed => f.write_str("1"),
            Reply::Rejected => f.write_str("2"),
            Reply::Malformed => f.write_str("3"),
            Reply::Balance(balance) => write!(f, "{balance:.2}"),
            Reply::Error(message) => write!(f, "ERROR {message}"),
        }
    }
}
