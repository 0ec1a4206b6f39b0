//! Thread-safe account storage and balance mutation
//!
//! This module provides the `AccountStore` struct, the single process-wide
//! owner of all account records. It is populated once at startup by the
//! account-file loader and then shared by every connection task.
//!
//! # Thread Safety
//!
//! The store uses `DashMap` for fine-grained locking: operations on
//! different accounts proceed concurrently, while the read-modify-write of
//! a single account's balance runs under that entry's lock. Even if two
//! connections ever reached the same account (which the session registry
//! prevents), no deposit or withdrawal could be lost.

use crate::types::{amount_is_valid, Account, AccountId, BankError, Pin};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::str::FromStr;

/// In-memory mapping from account identifier to account record
///
/// Accounts are created only through [`AccountStore::load`] and are never
/// removed while the server runs.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Concurrent map of normalized account identifiers to records
    accounts: DashMap<AccountId, Account>,
}

impl AccountStore {
    /// Create a new empty AccountStore
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Load one account record, as parsed from the account file
    ///
    /// All arguments arrive as text. The identifier and PIN are validated
    /// and normalized; the balance must parse as a non-negative amount with
    /// at most two fractional digits. Duplicate identifiers are rejected,
    /// so the first occurrence in the file wins.
    ///
    /// # Returns
    ///
    /// The normalized identifier of the newly inserted account.
    ///
    /// # Errors
    ///
    /// * `InvalidAccountId` / `InvalidPin` / `InvalidBalance` - a field is
    ///   malformed; nothing is inserted
    /// * `DuplicateAccount` - the identifier already exists
    pub fn load(&self, id: &str, pin: &str, balance_text: &str) -> Result<AccountId, BankError> {
        let id: AccountId = id.parse()?;
        let pin: Pin = pin.parse()?;
        let balance = Decimal::from_str(balance_text)
            .map_err(|_| BankError::invalid_balance(balance_text))?;
        if !amount_is_valid(balance) {
            return Err(BankError::invalid_balance(balance_text));
        }

        match self.accounts.entry(id.clone()) {
            Entry::Occupied(_) => Err(BankError::duplicate_account(id.as_str())),
            Entry::Vacant(entry) => {
                entry.insert(Account::new(id.clone(), pin, balance));
                Ok(id)
            }
        }
    }

    /// Look up an account by identifier
    ///
    /// # Returns
    ///
    /// A snapshot clone of the account, or `None` if no such account
    /// exists. Concurrent mutations are not reflected in the clone.
    pub fn lookup(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).map(|entry| entry.clone())
    }

    /// Current balance of an account, if it exists
    pub fn balance(&self, id: &AccountId) -> Option<Decimal> {
        self.accounts.get(id).map(|entry| entry.balance)
    }

    /// Check a candidate PIN against an account
    ///
    /// Returns `false` both for a PIN mismatch and for an unknown account,
    /// so callers cannot distinguish the two (and need not).
    pub fn verify_pin(&self, id: &AccountId, candidate: &str) -> bool {
        self.accounts
            .get(id)
            .is_some_and(|entry| entry.pin.matches(candidate))
    }

    /// Deposit funds into an account
    ///
    /// The new balance is `round(old + amount, 2)`. Runs under the
    /// account's entry lock, so concurrent deposits to the same account
    /// are serialized.
    ///
    /// # Returns
    ///
    /// The new balance after the deposit.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - amount is negative or has more than two decimal
    ///   places; balance unchanged
    /// * `ArithmeticOverflow` - the sum exceeds the decimal range; balance
    ///   unchanged
    /// * `AccountNotFound` - no such account
    pub fn deposit(&self, id: &AccountId, amount: Decimal) -> Result<Decimal, BankError> {
        if !amount_is_valid(amount) {
            return Err(BankError::invalid_amount(amount, id.as_str()));
        }

        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| BankError::account_not_found(id.as_str()))?;
        let new_balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| BankError::arithmetic_overflow("deposit", id.as_str()))?;
        account.balance = new_balance.round_dp(2);
        Ok(account.balance)
    }

    /// Withdraw funds from an account
    ///
    /// The new balance is `round(old - amount, 2)`. Runs under the
    /// account's entry lock, so the overdraft check and the subtraction
    /// are atomic with respect to other connections.
    ///
    /// # Returns
    ///
    /// The new balance after the withdrawal.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - amount is negative or has more than two decimal
    ///   places; balance unchanged
    /// * `Overdraft` - amount exceeds the current balance; balance unchanged
    /// * `AccountNotFound` - no such account
    pub fn withdraw(&self, id: &AccountId, amount: Decimal) -> Result<Decimal, BankError> {
        if !amount_is_valid(amount) {
            return Err(BankError::invalid_amount(amount, id.as_str()));
        }

        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| BankError::account_not_found(id.as_str()))?;
        if amount > account.balance {
            return Err(BankError::overdraft(id.as_str(), account.balance, amount));
        }
        let new_balance = account
            .balance
            .checked_sub(amount)
            .ok_or_else(|| BankError::arithmetic_overflow("withdrawal", id.as_str()))?;
        account.balance = new_balance.round_dp(2);
        Ok(account.balance)
    }

    /// Number of loaded accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if no accounts have been loaded
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn store_with_account(balance: &str) -> (AccountStore, AccountId) {
        let store = AccountStore::new();
        let id = store.load("ab-12345", "1234", balance).unwrap();
        (store, id)
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_load_inserts_account() {
        let store = AccountStore::new();
        let id = store.load("AB-12345", "1234", "100.00").unwrap();

        assert_eq!(id.as_str(), "ab-12345");
        assert_eq!(store.len(), 1);

        let account = store.lookup(&id).unwrap();
        assert_eq!(account.balance, dec("100.00"));
        assert!(account.pin.matches("1234"));
    }

    #[rstest]
    #[case::bad_id("ab12345", "1234", "100.00")]
    #[case::bad_pin("ab-12345", "12", "100.00")]
    #[case::unparseable_balance("ab-12345", "1234", "lots")]
    #[case::negative_balance("ab-12345", "1234", "-5.00")]
    #[case::three_decimal_balance("ab-12345", "1234", "10.005")]
    fn test_load_rejects_malformed_records(
        #[case] id: &str,
        #[case] pin: &str,
        #[case] balance: &str,
    ) {
        let store = AccountStore::new();
        assert!(store.load(id, pin, balance).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_rejects_duplicate_first_occurrence_wins() {
        let store = AccountStore::new();
        let id = store.load("ab-12345", "1234", "100.00").unwrap();

        let result = store.load("AB-12345", "9999", "999.00");
        assert!(matches!(result, Err(BankError::DuplicateAccount { .. })));

        // The original record is untouched.
        let account = store.lookup(&id).unwrap();
        assert_eq!(account.balance, dec("100.00"));
        assert!(account.pin.matches("1234"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_account() {
        let store = AccountStore::new();
        let id: AccountId = "zz-99999".parse().unwrap();
        assert!(store.lookup(&id).is_none());
        assert!(store.balance(&id).is_none());
    }

    #[rstest]
    #[case::correct_pin("1234", true)]
    #[case::wrong_pin("0000", false)]
    #[case::short_pin("12", false)]
    fn test_verify_pin(#[case] candidate: &str, #[case] expected: bool) {
        let (store, id) = store_with_account("100.00");
        assert_eq!(store.verify_pin(&id, candidate), expected);
    }

    #[test]
    fn test_verify_pin_unknown_account() {
        let store = AccountStore::new();
        let id: AccountId = "zz-99999".parse().unwrap();
        assert!(!store.verify_pin(&id, "1234"));
    }

    #[rstest]
    #[case::whole("100.00", "50", "150.00")]
    #[case::cents("100.00", "0.01", "100.01")]
    #[case::zero("100.00", "0", "100.00")]
    #[case::rounding("0.10", "0.2", "0.30")]
    fn test_deposit_adds_and_rounds(
        #[case] opening: &str,
        #[case] amount: &str,
        #[case] expected: &str,
    ) {
        let (store, id) = store_with_account(opening);
        let new_balance = store.deposit(&id, dec(amount)).unwrap();
        assert_eq!(new_balance, dec(expected));
        assert_eq!(store.balance(&id).unwrap(), dec(expected));
    }

    #[rstest]
    #[case::negative("-1.00")]
    #[case::three_decimals("123.456")]
    fn test_deposit_invalid_amount_leaves_balance_unchanged(#[case] amount: &str) {
        let (store, id) = store_with_account("100.00");

        // Repeating the same failed deposit never mutates the balance.
        for _ in 0..3 {
            let result = store.deposit(&id, dec(amount));
            assert!(matches!(result, Err(BankError::InvalidAmount { .. })));
            assert_eq!(store.balance(&id).unwrap(), dec("100.00"));
        }
    }

    #[test]
    fn test_deposit_overflow_leaves_balance_unchanged() {
        let (store, id) = store_with_account("100.00");

        // Decimal::MAX is non-negative with no fractional digits, so it
        // passes amount validation; the addition itself must not panic.
        for _ in 0..3 {
            let result = store.deposit(&id, Decimal::MAX);
            assert!(matches!(result, Err(BankError::ArithmeticOverflow { .. })));
            assert_eq!(store.balance(&id).unwrap(), dec("100.00"));
        }
    }

    #[test]
    fn test_deposit_near_max_still_succeeds() {
        let (store, id) = store_with_account("0.00");
        let new_balance = store.deposit(&id, Decimal::MAX).unwrap();
        assert_eq!(new_balance, Decimal::MAX);
    }

    #[test]
    fn test_deposit_unknown_account() {
        let store = AccountStore::new();
        let id: AccountId = "zz-99999".parse().unwrap();
        assert!(matches!(
            store.deposit(&id, dec("1.00")),
            Err(BankError::AccountNotFound { .. })
        ));
    }

    #[rstest]
    #[case::partial("100.00", "40.25", "59.75")]
    #[case::everything("100.00", "100.00", "0.00")]
    #[case::zero("100.00", "0", "100.00")]
    fn test_withdraw_subtracts_and_rounds(
        #[case] opening: &str,
        #[case] amount: &str,
        #[case] expected: &str,
    ) {
        let (store, id) = store_with_account(opening);
        let new_balance = store.withdraw(&id, dec(amount)).unwrap();
        assert_eq!(new_balance, dec(expected));
    }

    #[test]
    fn test_withdraw_overdraft_leaves_balance_unchanged() {
        let (store, id) = store_with_account("150.00");

        for _ in 0..3 {
            let result = store.withdraw(&id, dec("200"));
            assert!(matches!(result, Err(BankError::Overdraft { .. })));
            assert_eq!(store.balance(&id).unwrap(), dec("150.00"));
        }
    }

    #[rstest]
    #[case::negative("-1.00")]
    #[case::three_decimals("0.001")]
    fn test_withdraw_invalid_amount_leaves_balance_unchanged(#[case] amount: &str) {
        let (store, id) = store_with_account("100.00");
        let result = store.withdraw(&id, dec(amount));
        assert!(matches!(result, Err(BankError::InvalidAmount { .. })));
        assert_eq!(store.balance(&id).unwrap(), dec("100.00"));
    }

    #[rstest]
    #[case::small("100.00", "0.01")]
    #[case::whole("100.00", "42")]
    #[case::everything_plus("0.50", "99.99")]
    fn test_deposit_then_withdraw_restores_balance(#[case] opening: &str, #[case] x: &str) {
        let (store, id) = store_with_account(opening);
        store.deposit(&id, dec(x)).unwrap();
        store.withdraw(&id, dec(x)).unwrap();
        assert_eq!(store.balance(&id).unwrap(), dec(opening));
    }

    #[test]
    fn test_concurrent_deposits_are_not_lost() {
        use std::sync::Arc;

        let store = Arc::new(AccountStore::new());
        let id = store.load("ab-12345", "1234", "0.00").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.deposit(&id, Decimal::ONE).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.balance(&id).unwrap(), dec("800"));
    }
}
