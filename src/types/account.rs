//! Account-related types for the bank server
//!
//! This module defines the account identity types (`AccountId`, `Pin`) and
//! the `Account` structure holding a client's balance.

use crate::types::BankError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Opaque identifier for one accepted connection
///
/// Handed out by the accept loop and used as the binding key in the
/// session registry. Never derived from a runtime thread identity.
pub type ConnectionId = u64;

/// Canonical bank account identifier
///
/// Format is `AA-NNNNN`: two ASCII alphabetic characters, a hyphen, and
/// five ASCII digits. Input is case-insensitive and is normalized to
/// lowercase, so `AB-12345` and `ab-12345` name the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// View the normalized (lowercase) identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = BankError;

    /// Parse and normalize an account identifier
    ///
    /// # Errors
    ///
    /// Returns `BankError::InvalidAccountId` if the input does not match
    /// the `AA-NNNNN` format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 8
            && bytes[2] == b'-'
            && bytes[..2].iter().all(u8::is_ascii_alphabetic)
            && bytes[3..].iter().all(u8::is_ascii_digit);

        if well_formed {
            Ok(AccountId(s.to_ascii_lowercase()))
        } else {
            Err(BankError::invalid_account_id(s))
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four-digit account PIN
///
/// Stored as the exact string supplied at load time so that leading
/// zeros are preserved (`0042` and `42` are different PINs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// Compare a candidate PIN string against this PIN
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl FromStr for Pin {
    type Err = BankError;

    /// Parse a PIN, requiring exactly four ASCII digits
    ///
    /// # Errors
    ///
    /// Returns `BankError::InvalidPin` for any other shape.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Pin(s.to_string()))
        } else {
            Err(BankError::invalid_pin(s))
        }
    }
}

/// Check that an amount is valid for banking transactions
///
/// A valid amount is non-negative and representable with at most two
/// fractional digits. Comparison against the rounded value is numeric,
/// so `50.00` and `50.0000` are both valid while `50.005` is not.
pub fn amount_is_valid(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount.round_dp(2) == amount
}

/// One bank account record
///
/// Created once at startup by the account-file loader and mutated in
/// place by deposits and withdrawals. The balance is never negative and
/// always carries at most two fractional digits.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The normalized account identifier
    pub id: AccountId,

    /// The four-digit PIN used to validate a login
    pub pin: Pin,

    /// Current balance, rounded to two decimal places on every mutation
    pub balance: Decimal,
}

impl Account {
    /// Create a new account with the given identity and opening balance
    pub fn new(id: AccountId, pin: Pin, balance: Decimal) -> Self {
        Account {
            id,
            pin,
            balance: balance.round_dp(2),
        }
    }
}
