//! Error types for the bank server
//!
//! This module defines all error types that can occur while loading the
//! account file and while serving client sessions.
//!
//! # Error Categories
//!
//! - **Load-time errors**: malformed identifiers, PINs, or balances in the
//!   account file, and duplicate identifiers. Recoverable: the record is
//!   skipped and loading continues.
//! - **Business errors**: invalid amounts and attempted overdrafts. The
//!   account state is left unchanged and the client may retry.
//! - **Protocol errors**: malformed frames and unrecognized commands.
//! - **Transport errors**: I/O failures on the listener or a connection.
//!   Treated like a clean disconnect; they never crash the listener.

use rust_decimal::Decimal;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Main error type for the bank server
///
/// Each variant includes enough context to log a useful diagnostic.
/// None of the per-connection variants are fatal to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    /// Account identifier does not match the `AA-NNNNN` format
    #[error("invalid account identifier '{value}'")]
    InvalidAccountId {
        /// The rejected identifier text
        value: String,
    },

    /// PIN is not exactly four ASCII digits
    #[error("invalid PIN '{value}': must be four digits")]
    InvalidPin {
        /// The rejected PIN text
        value: String,
    },

    /// Balance field in the account file is not a valid amount
    #[error("invalid balance '{value}': must be a non-negative amount with at most two decimal places")]
    InvalidBalance {
        /// The rejected balance text
        value: String,
    },

    /// Account identifier already present in the store
    ///
    /// First occurrence wins; the duplicate record is skipped.
    #[error("duplicate account detected: {id} - ignored")]
    DuplicateAccount {
        /// The duplicated identifier
        id: String,
    },

    /// No account exists for the identifier
    #[error("account {id} not found")]
    AccountNotFound {
        /// The unknown identifier
        id: String,
    },

    /// Transaction amount is negative or carries more than two decimals
    ///
    /// The balance is left unchanged; the client may retry.
    #[error("invalid amount '{amount}' for account {id}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Account the transaction targeted
        id: String,
    },

    /// Balance arithmetic would overflow the decimal range
    ///
    /// The balance is left unchanged; the transaction is rejected to
    /// keep the account intact.
    #[error("arithmetic overflow in {operation} for account {id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account the transaction targeted
        id: String,
    },

    /// Withdrawal exceeds the current balance
    ///
    /// The balance is left unchanged; the client may retry.
    #[error("attempted overdraft on account {id}: balance {balance}, requested {requested}")]
    Overdraft {
        /// Account the withdrawal targeted
        id: String,
        /// Balance at the time of the attempt
        balance: Decimal,
        /// Requested withdrawal amount
        requested: Decimal,
    },

    /// Wire frame has the wrong shape or too few arguments
    #[error("malformed frame: {message}")]
    MalformedFrame {
        /// Description of what was wrong with the frame
        message: String,
    },

    /// I/O error on the listener, a connection, or the account file
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

// Conversion from io::Error to BankError
impl From<std::io::Error> for BankError {
    fn from(error: std::io::Error) -> Self {
        BankError::Io {
            message: error.to_string(),
        }
    }
}

// Conversion from the line codec's error (either an I/O failure or an
// over-long line) to BankError
impl From<LinesCodecError> for BankError {
    fn from(error: LinesCodecError) -> Self {
        BankError::Io {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl BankError {
    /// Create an InvalidAccountId error
    pub fn invalid_account_id(value: &str) -> Self {
        BankError::InvalidAccountId {
            value: value.to_string(),
        }
    }

    /// Create an InvalidPin error
    pub fn invalid_pin(value: &str) -> Self {
        BankError::InvalidPin {
            value: value.to_string(),
        }
    }

    /// Create an InvalidBalance error
    pub fn invalid_balance(value: &str) -> Self {
        BankError::InvalidBalance {
            value: value.to_string(),
        }
    }

    /// Create a DuplicateAccount error
    pub fn duplicate_account(id: &str) -> Self {
        BankError::DuplicateAccount { id: id.to_string() }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(id: &str) -> Self {
        BankError::AccountNotFound { id: id.to_string() }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, id: &str) -> Self {
        BankError::InvalidAmount {
            amount,
            id: id.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, id: &str) -> Self {
        BankError::ArithmeticOverflow {
            operation: operation.to_string(),
            id: id.to_string(),
        }
    }

    /// Create an Overdraft error
    pub fn overdraft(id: &str, balance: Decimal, requested: Decimal) -> Self {
        BankError::Overdraft {
            id: id.to_string(),
            balance,
            requested,
        }
    }

    /// Create a MalformedFrame error
    pub fn malformed_frame(message: &str) -> Self {
        BankError::MalformedFrame {
            message: message.to_string(),
        }
    }
}
