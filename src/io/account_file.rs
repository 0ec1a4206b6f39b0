//! Account file ingestion
//!
//! Reads newline-delimited text records of the form:
//!
//! ```text
//! # comment lines start with a hash
//! AB-12345, 1234, 100.00
//! cd-67890,0042,0.50
//! ```
//!
//! Alphabetic characters are lowercased and all whitespace is stripped
//! before the record is split on commas. Bad records (wrong field count,
//! malformed identifier/PIN/balance, duplicate identifier) are logged and
//! skipped; they never abort the load.

use crate::core::AccountStore;
use crate::types::BankError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Load all account records from `path` into the store
///
/// # Returns
///
/// The number of accounts successfully loaded.
///
/// # Errors
///
/// Returns `BankError::Io` only if the file itself cannot be opened or
/// read. Individual bad records are logged at `warn` level and skipped.
pub fn load_accounts(path: &Path, store: &AccountStore) -> Result<usize, BankError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut loaded = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Lowercase and strip all whitespace, then split on commas.
        let normalized: String = line
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let fields: Vec<&str> = normalized.split(',').collect();
        if fields.len() != 3 {
            warn!(
                line = line_number,
                record = %line,
                "invalid entry in account file - ignored"
            );
            continue;
        }

        match store.load(fields[0], fields[1], fields[2]) {
            Ok(id) => {
                debug!(line = line_number, account = %id, "loaded account");
                loaded += 1;
            }
            Err(error) => {
                warn!(line = line_number, %error, "skipping account record");
            }
        }
    }

    Ok(loaded)
}
