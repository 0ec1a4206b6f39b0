//! Request frame parsing
//!
//! Converts one delimited text frame into a typed [`Command`]. Arguments
//! are kept as raw text here; numeric and identifier validation belongs to
//! the account store, so that an unparseable amount is a business failure
//! rather than a framing failure.

use super::FIELD_DELIMITER;
use crate::types::BankError;

/// One parsed request frame
///
/// Transient: derived from a single wire frame, dispatched once, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `Validate##<account>##<pin>` - log a connection into an account
    Validate {
        /// Account identifier as sent on the wire (not yet validated)
        account: String,
        /// Candidate PIN as sent on the wire
        pin: String,
    },

    /// `Balance` - report the bound account's current balance
    Balance,

    /// `Deposit##<amount>` - credit the bound account
    Deposit {
        /// Amount as decimal text (not yet validated)
        amount: String,
    },

    /// `Withdraw##<amount>` - debit the bound account
    Withdraw {
        /// Amount as decimal text (not yet validated)
        amount: String,
    },

    /// `END` - close the session and the connection
    ///
    /// Legacy clients append the account identifier; it is ignored.
    End,

    /// Any unrecognized command name
    ///
    /// The server answers with an error text and closes the connection.
    Unknown(String),
}

/// Parse one wire frame into a [`Command`]
///
/// Splits the frame on `##`. The first field names the command; a command
/// supplied with fewer arguments than it requires is malformed. Extra
/// trailing fields are ignored.
///
/// # Errors
///
/// Returns `BankError::MalformedFrame` for an empty frame or missing
/// required arguments. A malformed frame must not mutate any state; the
/// caller answers with result code `3` and keeps the connection open.
pub fn parse_frame(frame: &str) -> Result<Command, BankError> {
    let mut fields = frame.split(FIELD_DELIMITER);
    let name = fields.next().unwrap_or_default();

    match name {
        "" => Err(BankError::malformed_frame("empty frame")),
        "Validate" => {
            let account = fields
                .next()
                .ok_or_else(|| BankError::malformed_frame("Validate requires an account"))?;
            let pin = fields
                .next()
                .ok_or_else(|| BankError::malformed_frame("Validate requires a PIN"))?;
            Ok(Command::Validate {
                account: account.to_string(),
                pin: pin.to_string(),
            })
        }
        "Balance" => Ok(Command::Balance),
        "Deposit" => {
            let amount = fields
                .next()
                .ok_or_else(|| BankError::malformed_frame("Deposit requires an amount"))?;
            Ok(Command::Deposit {
                amount: amount.to_string(),
            })
        }
        "Withdraw" => {
            let amount = fields
                .next()
                .ok_or_else(|| BankError::malformed_frame("Withdraw requires an amount"))?;
            Ok(Command::Withdraw {
                amount: amount.to_string(),
            })
        }
        "END" => Ok(Command::End),
        other => Ok(Command::Unknown(other.to_string())),
    }
}
